use crate::{
    directory::{SequenceOp, Shape, TypeDirectory},
    expr::{
        BinaryExpr, BinaryOp, CallExpr, CallTarget, ConditionalExpr, ConstantExpr, Expr,
        ExprError, LambdaExpr, MemberExpr, OpClass, ParamId, ParameterExpr, UnaryExpr, UnaryOp,
    },
    value::{TypeTag, Value},
};
use predwire_primitives::ScalarKind;

///
/// ExprBuilder
///
/// Type-checking constructor for host expressions. Every reference is
/// resolved through the supplied directory, so a tree built here only
/// names allow-listed types, members, and methods.
///

pub struct ExprBuilder<'a> {
    directory: &'a dyn TypeDirectory,
    next_param: u32,
}

impl<'a> ExprBuilder<'a> {
    #[must_use]
    pub fn new(directory: &'a dyn TypeDirectory) -> Self {
        Self {
            directory,
            next_param: 0,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &'a dyn TypeDirectory {
        self.directory
    }

    /// Declare a fresh parameter; each call yields a distinct identity.
    pub fn parameter(
        &mut self,
        name: impl Into<String>,
        ty: TypeTag,
    ) -> Result<ParameterExpr, ExprError> {
        let ty = self.resolve_type(&ty)?;
        let id = ParamId(self.next_param);
        self.next_param = self.next_param.saturating_add(1);

        Ok(ParameterExpr {
            id,
            name: name.into(),
            ty,
        })
    }

    /// Constant with a type inferred from the value.
    pub fn constant(&self, value: impl Into<Value>) -> Result<Expr, ExprError> {
        let value = value.into();
        let ty = infer_type(&value)?;

        self.typed_constant(ty, value)
    }

    pub fn typed_constant(&self, ty: TypeTag, value: Value) -> Result<Expr, ExprError> {
        let ty = self.resolve_type(&ty)?;
        if !value.conforms_to(&ty) {
            return Err(ExprError::ConstantMismatch {
                ty,
                found: value.kind_label(),
            });
        }

        Ok(Expr::Constant(ConstantExpr { value, ty }))
    }

    pub fn member(&self, target: Expr, member: &str) -> Result<Expr, ExprError> {
        if target.as_lambda().is_some() {
            return Err(lambda_operand("."));
        }

        let resolved = self
            .directory
            .resolve_member(target.ty(), member)
            .ok_or_else(|| ExprError::UnknownMember {
                ty: target.ty().clone(),
                member: member.to_string(),
            })?;

        Ok(Expr::Member(MemberExpr {
            target: Box::new(target),
            member: resolved,
        }))
    }

    pub fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, ExprError> {
        if left.as_lambda().is_some() || right.as_lambda().is_some() {
            return Err(lambda_operand(op.symbol()));
        }

        let ty = binary_result(op, left.ty(), right.ty()).ok_or_else(|| {
            ExprError::IncompatibleOperands {
                op: op.symbol(),
                left: left.ty().clone(),
                right: right.ty().clone(),
            }
        })?;

        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        }))
    }

    pub fn and(&self, left: Expr, right: Expr) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::AndAlso, left, right)
    }

    pub fn or(&self, left: Expr, right: Expr) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::OrElse, left, right)
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr) -> Result<Expr, ExprError> {
        if operand.as_lambda().is_some() {
            return Err(lambda_operand(op.symbol()));
        }

        let accepted = match op {
            UnaryOp::Not => operand.ty().is_bool(),
            UnaryOp::Negate => matches!(
                operand.ty().scalar(),
                Some(ScalarKind::Int | ScalarKind::Float64)
            ),
        };
        if !accepted {
            return Err(ExprError::IncompatibleOperand {
                op: op.symbol(),
                operand: operand.ty().clone(),
            });
        }

        let ty = operand.ty().clone();
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            ty,
        }))
    }

    pub fn not(&self, operand: Expr) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Not, operand)
    }

    pub fn negate(&self, operand: Expr) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Negate, operand)
    }

    /// Instance method call on `receiver`.
    pub fn call(&self, receiver: Expr, method: &str, args: Vec<Expr>) -> Result<Expr, ExprError> {
        if receiver.as_lambda().is_some() || args.iter().any(|arg| arg.as_lambda().is_some()) {
            return Err(lambda_operand("call"));
        }

        let arg_types: Vec<TypeTag> = args.iter().map(|arg| arg.ty().clone()).collect();
        let (def, ty) = self
            .directory
            .resolve_method(receiver.ty(), method, &arg_types)
            .ok_or_else(|| ExprError::UnknownMethod {
                receiver: receiver.ty().clone(),
                method: method.to_string(),
                args: arg_types,
            })?;

        Ok(Expr::Call(CallExpr {
            receiver: Some(Box::new(receiver)),
            target: CallTarget::Instance(def),
            args,
            ty,
        }))
    }

    /// Receiver-less sequence operation; `args[0]` is the source sequence.
    pub fn sequence_call(&self, method: &str, args: Vec<Expr>) -> Result<Expr, ExprError> {
        let (op, ty) = resolve_sequence(self.directory, method, &args)?;

        Ok(Expr::Call(CallExpr {
            receiver: None,
            target: CallTarget::Sequence(op),
            args,
            ty,
        }))
    }

    pub fn lambda(&self, params: Vec<ParameterExpr>, body: Expr) -> Result<LambdaExpr, ExprError> {
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.id == param.id) {
                return Err(ExprError::DuplicateParameter {
                    name: param.name.clone(),
                    ty: param.ty.clone(),
                });
            }
        }

        Ok(LambdaExpr {
            params,
            body: Box::new(body),
        })
    }

    pub fn conditional(
        &self,
        test: Expr,
        if_true: Expr,
        if_false: Expr,
    ) -> Result<Expr, ExprError> {
        if [&test, &if_true, &if_false]
            .iter()
            .any(|expr| expr.as_lambda().is_some())
        {
            return Err(lambda_operand("?:"));
        }
        if !test.ty().is_bool() {
            return Err(ExprError::IncompatibleOperand {
                op: "?:",
                operand: test.ty().clone(),
            });
        }
        if if_true.ty() != if_false.ty() {
            return Err(ExprError::IncompatibleOperands {
                op: "?:",
                left: if_true.ty().clone(),
                right: if_false.ty().clone(),
            });
        }

        let ty = if_true.ty().clone();
        Ok(Expr::Conditional(ConditionalExpr {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            ty,
        }))
    }

    fn resolve_type(&self, ty: &TypeTag) -> Result<TypeTag, ExprError> {
        self.directory
            .resolve_type(ty)
            .ok_or_else(|| ExprError::UnknownType { ty: ty.clone() })
    }
}

///
/// TYPE RULES
///

/// Result type of `left op right`, or `None` when the operands are not
/// compatible with the operator class.
#[must_use]
pub(crate) fn binary_result(op: BinaryOp, left: &TypeTag, right: &TypeTag) -> Option<TypeTag> {
    let same = left == right;

    match op.class() {
        OpClass::Equality => {
            let nullable = matches!(left, TypeTag::Null) || matches!(right, TypeTag::Null);
            ((same && left.supports_equality()) || nullable).then_some(TypeTag::BOOL)
        }
        OpClass::Ordering => (same && left.supports_ordering()).then_some(TypeTag::BOOL),
        OpClass::Logical => (left.is_bool() && right.is_bool()).then_some(TypeTag::BOOL),
        OpClass::Arithmetic => (same && left.supports_arithmetic()).then(|| left.clone()),
    }
}

/// Bind a sequence operation by name, arity, and argument shapes.
///
/// Exactly one candidate must accept the specialized arguments.
pub(crate) fn resolve_sequence(
    directory: &dyn TypeDirectory,
    method: &str,
    args: &[Expr],
) -> Result<(&'static SequenceOp, TypeTag), ExprError> {
    let unknown = || ExprError::UnknownSequenceOp {
        method: method.to_string(),
        args: args.iter().map(|arg| arg.ty().clone()).collect(),
    };

    let element = args
        .first()
        .and_then(|source| source.ty().element())
        .ok_or_else(unknown)?;

    let matching: Vec<&'static SequenceOp> = directory
        .sequence_ops(method, args.len())
        .into_iter()
        .filter(|op| sequence_accepts(op, element, args))
        .collect();

    match matching.as_slice() {
        [op] => {
            let ty = op.result.specialize(Some(element)).ok_or_else(unknown)?;
            Ok((*op, ty))
        }
        [] => Err(unknown()),
        _ => Err(ExprError::AmbiguousSequenceOp {
            method: method.to_string(),
            args: args.iter().map(|arg| arg.ty().clone()).collect(),
            candidates: matching.len(),
        }),
    }
}

fn sequence_accepts(op: &SequenceOp, element: &TypeTag, args: &[Expr]) -> bool {
    op.params.len() == args.len()
        && op.params.iter().zip(args).all(|(shape, arg)| match shape {
            Shape::Predicate => arg.as_lambda().is_some_and(|lambda| {
                lambda.params.len() == 1
                    && lambda.params.first().is_some_and(|p| &p.ty == element)
                    && lambda.ty().is_bool()
            }),
            _ => {
                arg.as_lambda().is_none()
                    && shape.specialize(Some(element)).as_ref() == Some(arg.ty())
            }
        })
}

fn lambda_operand(op: &'static str) -> ExprError {
    ExprError::LambdaOperand { op }
}

fn infer_type(value: &Value) -> Result<TypeTag, ExprError> {
    let ty = match value {
        Value::Bool(_) => TypeTag::BOOL,
        Value::Float64(_) => TypeTag::FLOAT64,
        Value::Int(_) => TypeTag::INT,
        Value::Null => TypeTag::Null,
        Value::Text(_) => TypeTag::TEXT,
        Value::Uint(_) => TypeTag::UINT,
        Value::Ulid(_) => TypeTag::ULID,
        Value::Record(record) => TypeTag::entity(record.entity()),
        Value::List(items) => {
            let first = items.first().ok_or(ExprError::UninferableConstant)?;
            TypeTag::list(infer_type(first)?)
        }
    };

    Ok(ty)
}
