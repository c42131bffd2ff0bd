//! Module: directory::builtin
//! Responsibility: static allow-list of members, instance methods, and
//! sequence operations that encoded predicates may name.
//! Does not own: entity field lookup (see `TypeRegistry`).

use crate::{
    expr::EvalError,
    value::{TypeTag, Value},
};
use predwire_primitives::ScalarKind;

///
/// Shape
///
/// Parameter or result type expressed relative to the receiver's (or
/// sequence's) element type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shape {
    /// Fixed scalar type.
    Scalar(ScalarKind),
    /// `T` of the `List<T>` receiver or source sequence.
    Element,
    /// `List<T>` itself.
    Sequence,
    /// A single-parameter lambda `(T) -> Bool`.
    Predicate,
}

impl Shape {
    /// Concrete type for this shape once `T` is known.
    ///
    /// Predicates have no value type and always return `None`.
    #[must_use]
    pub fn specialize(self, element: Option<&TypeTag>) -> Option<TypeTag> {
        match self {
            Self::Scalar(kind) => Some(TypeTag::Scalar(kind)),
            Self::Element => element.cloned(),
            Self::Sequence => element.cloned().map(TypeTag::list),
            Self::Predicate => None,
        }
    }
}

///
/// ReceiverKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReceiverKind {
    Text,
    List,
}

impl ReceiverKind {
    /// Returns the receiver's element slot when `ty` is accepted.
    ///
    /// `Some(None)` means accepted without an element type (Text).
    #[must_use]
    pub fn accepts(self, ty: &TypeTag) -> Option<Option<&TypeTag>> {
        match (self, ty) {
            (Self::Text, TypeTag::Scalar(ScalarKind::Text)) => Some(None),
            (Self::List, TypeTag::List(element)) => Some(Some(element.as_ref())),
            _ => None,
        }
    }
}

pub type MemberFn = fn(&Value) -> Result<Value, EvalError>;
pub type MethodFn = fn(&Value, &[Value]) -> Result<Value, EvalError>;

///
/// BuiltinMember
///

#[derive(Debug)]
pub struct BuiltinMember {
    pub name: &'static str,
    pub receiver: ReceiverKind,
    pub result: Shape,
    pub read: MemberFn,
}

///
/// InstanceMethod
///

#[derive(Debug)]
pub struct InstanceMethod {
    pub name: &'static str,
    pub receiver: ReceiverKind,
    pub params: &'static [Shape],
    pub result: Shape,
    pub invoke: MethodFn,
}

impl InstanceMethod {
    /// Result type when this method accepts `receiver` with exactly `args`.
    #[must_use]
    pub fn bind(&self, receiver: &TypeTag, args: &[TypeTag]) -> Option<TypeTag> {
        let element = self.receiver.accepts(receiver)?;
        if self.params.len() != args.len() {
            return None;
        }

        let params_match = self
            .params
            .iter()
            .zip(args)
            .all(|(shape, arg)| shape.specialize(element).as_ref() == Some(arg));

        if params_match {
            self.result.specialize(element)
        } else {
            None
        }
    }
}

///
/// SequenceOpKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SequenceOpKind {
    AnyNonEmpty,
    AnyMatch,
    AllMatch,
    Count,
    CountMatch,
    Contains,
}

///
/// SequenceOp
///
/// Static (receiver-less) operation whose first parameter is the source
/// sequence. Generic over the sequence element type.
///

#[derive(Debug)]
pub struct SequenceOp {
    pub name: &'static str,
    pub kind: SequenceOpKind,
    pub params: &'static [Shape],
    pub result: Shape,
}

///
/// TABLES
///

pub static BUILTIN_MEMBERS: &[BuiltinMember] = &[
    BuiltinMember {
        name: "Length",
        receiver: ReceiverKind::Text,
        result: Shape::Scalar(ScalarKind::Int),
        read: text_length,
    },
    BuiltinMember {
        name: "Count",
        receiver: ReceiverKind::List,
        result: Shape::Scalar(ScalarKind::Int),
        read: list_count,
    },
];

const TEXT: Shape = Shape::Scalar(ScalarKind::Text);
const BOOL: Shape = Shape::Scalar(ScalarKind::Bool);

pub static INSTANCE_METHODS: &[InstanceMethod] = &[
    InstanceMethod {
        name: "StartsWith",
        receiver: ReceiverKind::Text,
        params: &[TEXT],
        result: BOOL,
        invoke: text_starts_with,
    },
    InstanceMethod {
        name: "EndsWith",
        receiver: ReceiverKind::Text,
        params: &[TEXT],
        result: BOOL,
        invoke: text_ends_with,
    },
    InstanceMethod {
        name: "Contains",
        receiver: ReceiverKind::Text,
        params: &[TEXT],
        result: BOOL,
        invoke: text_contains,
    },
    InstanceMethod {
        name: "Equals",
        receiver: ReceiverKind::Text,
        params: &[TEXT],
        result: BOOL,
        invoke: text_equals,
    },
    InstanceMethod {
        name: "Equals",
        receiver: ReceiverKind::Text,
        params: &[TEXT, BOOL],
        result: BOOL,
        invoke: text_equals_ignore_case,
    },
    InstanceMethod {
        name: "ToLower",
        receiver: ReceiverKind::Text,
        params: &[],
        result: TEXT,
        invoke: text_to_lower,
    },
    InstanceMethod {
        name: "ToUpper",
        receiver: ReceiverKind::Text,
        params: &[],
        result: TEXT,
        invoke: text_to_upper,
    },
    InstanceMethod {
        name: "Trim",
        receiver: ReceiverKind::Text,
        params: &[],
        result: TEXT,
        invoke: text_trim,
    },
    InstanceMethod {
        name: "IsEmpty",
        receiver: ReceiverKind::Text,
        params: &[],
        result: BOOL,
        invoke: text_is_empty,
    },
    InstanceMethod {
        name: "Contains",
        receiver: ReceiverKind::List,
        params: &[Shape::Element],
        result: BOOL,
        invoke: list_contains,
    },
];

pub static SEQUENCE_OPS: &[SequenceOp] = &[
    SequenceOp {
        name: "Any",
        kind: SequenceOpKind::AnyNonEmpty,
        params: &[Shape::Sequence],
        result: BOOL,
    },
    SequenceOp {
        name: "Any",
        kind: SequenceOpKind::AnyMatch,
        params: &[Shape::Sequence, Shape::Predicate],
        result: BOOL,
    },
    SequenceOp {
        name: "All",
        kind: SequenceOpKind::AllMatch,
        params: &[Shape::Sequence, Shape::Predicate],
        result: BOOL,
    },
    SequenceOp {
        name: "Count",
        kind: SequenceOpKind::Count,
        params: &[Shape::Sequence],
        result: Shape::Scalar(ScalarKind::Int),
    },
    SequenceOp {
        name: "Count",
        kind: SequenceOpKind::CountMatch,
        params: &[Shape::Sequence, Shape::Predicate],
        result: Shape::Scalar(ScalarKind::Int),
    },
    SequenceOp {
        name: "Contains",
        kind: SequenceOpKind::Contains,
        params: &[Shape::Sequence, Shape::Element],
        result: BOOL,
    },
];

#[must_use]
pub fn find_member(receiver: &TypeTag, name: &str) -> Option<&'static BuiltinMember> {
    BUILTIN_MEMBERS
        .iter()
        .find(|member| member.name == name && member.receiver.accepts(receiver).is_some())
}

///
/// INVOKE
///

fn text_receiver<'v>(op: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    value.as_text().ok_or_else(|| EvalError::InvalidOperand {
        op: op.to_string(),
        found: value.kind_label(),
    })
}

fn text_arg<'v>(op: &str, args: &'v [Value], index: usize) -> Result<&'v str, EvalError> {
    match args.get(index) {
        Some(value) => text_receiver(op, value),
        None => Err(EvalError::InvalidOperand {
            op: op.to_string(),
            found: "missing",
        }),
    }
}

fn len_value(op: &'static str, len: usize) -> Result<Value, EvalError> {
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| EvalError::Overflow { op })
}

fn text_length(value: &Value) -> Result<Value, EvalError> {
    len_value("Length", text_receiver("Length", value)?.chars().count())
}

fn list_count(value: &Value) -> Result<Value, EvalError> {
    let items = value.as_list().ok_or_else(|| EvalError::InvalidOperand {
        op: "Count".to_string(),
        found: value.kind_label(),
    })?;

    len_value("Count", items.len())
}

fn text_starts_with(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = text_receiver("StartsWith", recv)?;
    Ok(Value::Bool(text.starts_with(text_arg("StartsWith", args, 0)?)))
}

fn text_ends_with(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = text_receiver("EndsWith", recv)?;
    Ok(Value::Bool(text.ends_with(text_arg("EndsWith", args, 0)?)))
}

fn text_contains(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = text_receiver("Contains", recv)?;
    Ok(Value::Bool(text.contains(text_arg("Contains", args, 0)?)))
}

fn text_equals(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = text_receiver("Equals", recv)?;
    Ok(Value::Bool(text == text_arg("Equals", args, 0)?))
}

fn text_equals_ignore_case(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = text_receiver("Equals", recv)?;
    let other = text_arg("Equals", args, 0)?;
    let ignore_case = match args.get(1) {
        Some(Value::Bool(flag)) => *flag,
        other => {
            return Err(EvalError::InvalidOperand {
                op: "Equals".to_string(),
                found: other.map_or("missing", Value::kind_label),
            });
        }
    };

    let equal = if ignore_case {
        text.to_lowercase() == other.to_lowercase()
    } else {
        text == other
    };

    Ok(Value::Bool(equal))
}

fn text_to_lower(recv: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Text(text_receiver("ToLower", recv)?.to_lowercase()))
}

fn text_to_upper(recv: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Text(text_receiver("ToUpper", recv)?.to_uppercase()))
}

fn text_trim(recv: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Text(text_receiver("Trim", recv)?.trim().to_string()))
}

fn text_is_empty(recv: &Value, _: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(text_receiver("IsEmpty", recv)?.is_empty()))
}

fn list_contains(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let items = recv.as_list().ok_or_else(|| EvalError::InvalidOperand {
        op: "Contains".to_string(),
        found: recv.kind_label(),
    })?;
    let needle = args.first().ok_or_else(|| EvalError::InvalidOperand {
        op: "Contains".to_string(),
        found: "missing",
    })?;

    Ok(Value::Bool(items.contains(needle)))
}
