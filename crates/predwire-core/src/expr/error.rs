use crate::{expr::ParamId, value::TypeTag};
use thiserror::Error as ThisError;

///
/// ExprError
///
/// Construction-time failures raised by `ExprBuilder` when a host
/// expression would not be type-consistent.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExprError {
    #[error("type '{ty}' is not known to the type directory")]
    UnknownType { ty: TypeTag },

    #[error("type '{ty}' has no member '{member}'")]
    UnknownMember { ty: TypeTag, member: String },

    #[error("no method '{method}' on '{receiver}' accepts ({})", join_types(.args))]
    UnknownMethod {
        receiver: TypeTag,
        method: String,
        args: Vec<TypeTag>,
    },

    #[error("no sequence operation '{method}' accepts ({})", join_types(.args))]
    UnknownSequenceOp { method: String, args: Vec<TypeTag> },

    #[error("sequence operation '{method}' is ambiguous for ({}): {candidates} candidates match", join_types(.args))]
    AmbiguousSequenceOp {
        method: String,
        args: Vec<TypeTag>,
        candidates: usize,
    },

    #[error("operator '{op}' cannot combine '{left}' and '{right}'")]
    IncompatibleOperands {
        op: &'static str,
        left: TypeTag,
        right: TypeTag,
    },

    #[error("operator '{op}' cannot apply to '{operand}'")]
    IncompatibleOperand { op: &'static str, operand: TypeTag },

    #[error("operator '{op}' cannot take a lambda operand")]
    LambdaOperand { op: &'static str },

    #[error("{found} constant does not conform to '{ty}'")]
    ConstantMismatch { ty: TypeTag, found: &'static str },

    #[error("cannot infer a type for an empty list constant")]
    UninferableConstant,

    #[error("parameter '{name}: {ty}' is declared more than once")]
    DuplicateParameter { name: String, ty: TypeTag },
}

///
/// EvalError
///
/// Runtime failures raised while evaluating a host expression.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EvalError {
    #[error("parameter '{name}' ({id}) is not bound")]
    UnboundParameter { id: ParamId, name: String },

    #[error("record '{entity}' has no field '{field}'")]
    MissingField { entity: String, field: String },

    #[error("member '{member}' read from a non-record {found} value")]
    NotARecord { member: String, found: &'static str },

    #[error("'{op}' cannot evaluate a {found} operand")]
    InvalidOperand { op: String, found: &'static str },

    #[error("arithmetic overflow in '{op}'")]
    Overflow { op: &'static str },

    #[error("division by zero")]
    DivideByZero,

    #[error("a lambda is not a value and cannot be evaluated directly")]
    LambdaNotValue,

    #[error("predicate must take exactly one parameter, found {found}")]
    PredicateArity { found: usize },

    #[error("predicate body must be Bool, found '{found}'")]
    PredicateNotBoolean { found: TypeTag },

    #[error("subject {found} value does not conform to '{expected}'")]
    SubjectMismatch {
        expected: TypeTag,
        found: &'static str,
    },
}

pub(crate) fn join_types(types: &[TypeTag]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
