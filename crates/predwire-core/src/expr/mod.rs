//! Host expression tree.
//!
//! A typed, in-process predicate representation. Every node carries the
//! type it produces, and every member/method reference is already bound
//! to an allow-listed directory entry. Construct through `ExprBuilder`.

mod builder;
mod error;
mod eval;

#[cfg(test)]
mod tests;

use crate::{
    directory::{InstanceMethod, ResolvedMember, SequenceOp},
    value::{TypeTag, Value},
};
use derive_more::Display;

// re-exports
pub use builder::ExprBuilder;
pub use error::{EvalError, ExprError};
pub use eval::{CompiledPredicate, Env, evaluate, evaluate_closed};

///
/// ParamId
///
/// Identity of one parameter within a tree. Two parameters with the same
/// name and type are still distinct when their ids differ.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct ParamId(pub u32);

///
/// ParameterExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterExpr {
    pub id: ParamId,
    pub name: String,
    pub ty: TypeTag,
}

///
/// BinaryOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

///
/// OpClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpClass {
    Equality,
    Ordering,
    Logical,
    Arithmetic,
}

impl BinaryOp {
    #[must_use]
    pub const fn class(self) -> OpClass {
        match self {
            Self::Equal | Self::NotEqual => OpClass::Equality,
            Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual => OpClass::Ordering,
            Self::AndAlso | Self::OrElse => OpClass::Logical,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo => {
                OpClass::Arithmetic
            }
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::AndAlso => "&&",
            Self::OrElse => "||",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

///
/// UnaryOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
        }
    }
}

///
/// LambdaExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<ParameterExpr>,
    pub body: Box<Expr>,
}

impl LambdaExpr {
    /// Result type of the lambda (its body's type).
    #[must_use]
    pub fn ty(&self) -> &TypeTag {
        self.body.ty()
    }
}

///
/// BinaryExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub ty: TypeTag,
}

///
/// UnaryExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub ty: TypeTag,
}

///
/// MemberExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberExpr {
    pub target: Box<Expr>,
    pub member: ResolvedMember,
}

///
/// CallTarget
///

#[derive(Clone, Copy, Debug)]
pub enum CallTarget {
    Instance(&'static InstanceMethod),
    Sequence(&'static SequenceOp),
}

impl CallTarget {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Instance(method) => method.name,
            Self::Sequence(op) => op.name,
        }
    }
}

// table entries are compared by identity
impl PartialEq for CallTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Instance(a), Self::Instance(b)) => std::ptr::eq(*a, *b),
            (Self::Sequence(a), Self::Sequence(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for CallTarget {}

///
/// CallExpr
///
/// `receiver` is `None` for sequence operations, whose source sequence is
/// the first argument.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallExpr {
    pub receiver: Option<Box<Expr>>,
    pub target: CallTarget,
    pub args: Vec<Expr>,
    pub ty: TypeTag,
}

///
/// ConstantExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstantExpr {
    pub value: Value,
    pub ty: TypeTag,
}

///
/// ConditionalExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionalExpr {
    pub test: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
    pub ty: TypeTag,
}

///
/// Expr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Lambda(LambdaExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Member(MemberExpr),
    Call(CallExpr),
    Constant(ConstantExpr),
    Parameter(ParameterExpr),
    Conditional(ConditionalExpr),
}

impl Expr {
    #[must_use]
    pub fn ty(&self) -> &TypeTag {
        match self {
            Self::Lambda(lambda) => lambda.ty(),
            Self::Binary(expr) => &expr.ty,
            Self::Unary(expr) => &expr.ty,
            Self::Member(expr) => &expr.member.ty,
            Self::Call(expr) => &expr.ty,
            Self::Constant(expr) => &expr.ty,
            Self::Parameter(expr) => &expr.ty,
            Self::Conditional(expr) => &expr.ty,
        }
    }

    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Lambda(_) => "Lambda",
            Self::Binary(_) => "Binary",
            Self::Unary(_) => "Unary",
            Self::Member(_) => "Member",
            Self::Call(_) => "Call",
            Self::Constant(_) => "Constant",
            Self::Parameter(_) => "Parameter",
            Self::Conditional(_) => "Conditional",
        }
    }

    #[must_use]
    pub const fn as_lambda(&self) -> Option<&LambdaExpr> {
        if let Self::Lambda(lambda) = self {
            Some(lambda)
        } else {
            None
        }
    }
}

impl From<&ParameterExpr> for Expr {
    fn from(param: &ParameterExpr) -> Self {
        Self::Parameter(param.clone())
    }
}

impl From<LambdaExpr> for Expr {
    fn from(lambda: LambdaExpr) -> Self {
        Self::Lambda(lambda)
    }
}
