//! Wire node model: the closed grammar of portable predicate nodes.
//!
//! Pure data. Nodes carry names and type tags only; nothing here is bound
//! to a host type until the decoder resolves it through a directory.

use crate::value::{TypeTag, Value};
use derive_more::{Display, From};

///
/// NodeKind
///
/// Discriminator written with every node.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum NodeKind {
    Lambda,
    Binary,
    Unary,
    Member,
    MethodCall,
    Constant,
    Parameter,
}

impl NodeKind {
    pub const ALL: [Self; 7] = [
        Self::Lambda,
        Self::Binary,
        Self::Unary,
        Self::Member,
        Self::MethodCall,
        Self::Constant,
        Self::Parameter,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lambda => "Lambda",
            Self::Binary => "Binary",
            Self::Unary => "Unary",
            Self::Member => "Member",
            Self::MethodCall => "MethodCall",
            Self::Constant => "Constant",
            Self::Parameter => "Parameter",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

///
/// BinaryOperator
///
/// Comparison and logical operators only; arithmetic has no wire form.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
}

impl BinaryOperator {
    pub const ALL: [Self; 8] = [
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::AndAlso,
        Self::OrElse,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::AndAlso => "AndAlso",
            Self::OrElse => "OrElse",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

///
/// LambdaNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LambdaNode {
    pub parameters: Vec<ParameterNode>,
    pub body: Box<PredicateNode>,
    /// Subject type of a root predicate; metadata only, absent when nested.
    pub subject: Option<TypeTag>,
}

impl LambdaNode {
    /// Total node count, declared parameters included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.parameters.len() + self.body.node_count()
    }
}

///
/// BinaryNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryNode {
    pub operator: BinaryOperator,
    pub left: Box<PredicateNode>,
    pub right: Box<PredicateNode>,
}

///
/// UnaryNode
/// Logical negation.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnaryNode {
    pub operand: Box<PredicateNode>,
}

///
/// MemberNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberNode {
    pub target: Box<PredicateNode>,
    pub member: String,
}

///
/// MethodCallNode
///
/// No receiver means a collection-style call whose first argument is the
/// source sequence.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodCallNode {
    pub receiver: Option<MemberNode>,
    pub method: String,
    pub arguments: Vec<PredicateNode>,
}

///
/// ConstantNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstantNode {
    ty: TypeTag,
    value: Value,
}

impl ConstantNode {
    /// Pair a portable value with its exact type tag.
    ///
    /// Returns `None` when the value does not conform to `ty` or cannot
    /// travel on the wire.
    #[must_use]
    pub fn try_new(ty: TypeTag, value: Value) -> Option<Self> {
        (value.conforms_to(&ty) && value.is_portable()).then_some(Self { ty, value })
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeTag {
        &self.ty
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn into_parts(self) -> (TypeTag, Value) {
        (self.ty, self.value)
    }
}

///
/// ParameterNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ParameterNode {
    pub name: String,
    pub ty: TypeTag,
}

impl ParameterNode {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

///
/// PredicateNode
///

#[derive(Clone, Debug, Eq, From, PartialEq)]
pub enum PredicateNode {
    Lambda(LambdaNode),
    Binary(BinaryNode),
    Unary(UnaryNode),
    Member(MemberNode),
    MethodCall(MethodCallNode),
    Constant(ConstantNode),
    Parameter(ParameterNode),
}

impl PredicateNode {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Lambda(_) => NodeKind::Lambda,
            Self::Binary(_) => NodeKind::Binary,
            Self::Unary(_) => NodeKind::Unary,
            Self::Member(_) => NodeKind::Member,
            Self::MethodCall(_) => NodeKind::MethodCall,
            Self::Constant(_) => NodeKind::Constant,
            Self::Parameter(_) => NodeKind::Parameter,
        }
    }

    /// Total node count, this node included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let children: usize = match self {
            Self::Lambda(lambda) => return lambda.node_count(),
            Self::Binary(binary) => binary.left.node_count() + binary.right.node_count(),
            Self::Unary(unary) => unary.operand.node_count(),
            Self::Member(member) => member.target.node_count(),
            Self::MethodCall(call) => {
                call.receiver
                    .as_ref()
                    .map_or(0, |receiver| receiver.target.node_count() + 1)
                    + call.arguments.iter().map(Self::node_count).sum::<usize>()
            }
            Self::Constant(_) | Self::Parameter(_) => 0,
        };

        children + 1
    }
}

///
/// TESTS
///
