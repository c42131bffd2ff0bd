use predwire_primitives::ScalarKind;
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Maximum `List<...>` nesting accepted when parsing a portable type name.
pub const MAX_TYPE_NESTING: usize = 16;

const LIST_PREFIX: &str = "List<";
const NULL_NAME: &str = "Null";

///
/// TypeTag
///
/// Portable structural type used by host expressions, parameter and
/// constant nodes, and type-directory lookups.
///
/// `List<T>` is the only parameterized (generic-shaped) type.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TypeTag {
    Scalar(ScalarKind),
    Null,
    List(Box<Self>),
    Entity(String),
}

impl TypeTag {
    pub const BOOL: Self = Self::Scalar(ScalarKind::Bool);
    pub const FLOAT64: Self = Self::Scalar(ScalarKind::Float64);
    pub const INT: Self = Self::Scalar(ScalarKind::Int);
    pub const TEXT: Self = Self::Scalar(ScalarKind::Text);
    pub const UINT: Self = Self::Scalar(ScalarKind::Uint);
    pub const ULID: Self = Self::Scalar(ScalarKind::Ulid);

    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity(name.into())
    }

    #[must_use]
    pub const fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Element type of a parameterized type.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns true for generic-shaped types (currently only `List<T>`).
    #[must_use]
    pub const fn is_parameterized(&self) -> bool {
        matches!(self, Self::List(_))
    }

    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Scalar(ScalarKind::Bool))
    }

    #[must_use]
    pub const fn supports_equality(&self) -> bool {
        match self {
            Self::Scalar(kind) => kind.supports_equality(),
            Self::Null | Self::List(_) | Self::Entity(_) => true,
        }
    }

    #[must_use]
    pub const fn supports_ordering(&self) -> bool {
        match self {
            Self::Scalar(kind) => kind.supports_ordering(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn supports_arithmetic(&self) -> bool {
        match self {
            Self::Scalar(kind) => kind.supports_arithmetic(),
            _ => false,
        }
    }

    /// Parse a portable type name.
    pub fn parse(name: &str) -> Result<Self, TypeTagError> {
        parse_nested(name, 0)
    }
}

fn parse_nested(name: &str, depth: usize) -> Result<TypeTag, TypeTagError> {
    if depth > MAX_TYPE_NESTING {
        return Err(TypeTagError::TooDeep {
            max: MAX_TYPE_NESTING,
        });
    }
    if name.is_empty() {
        return Err(TypeTagError::Empty);
    }

    if let Some(kind) = ScalarKind::from_name(name) {
        return Ok(TypeTag::Scalar(kind));
    }
    if name == NULL_NAME {
        return Ok(TypeTag::Null);
    }
    if let Some(inner) = name
        .strip_prefix(LIST_PREFIX)
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return Ok(TypeTag::list(parse_nested(inner, depth + 1)?));
    }
    if is_identifier(name) && name != "List" {
        return Ok(TypeTag::Entity(name.to_string()));
    }

    Err(TypeTagError::Malformed {
        name: name.to_string(),
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.write_str(kind.name()),
            Self::Null => f.write_str(NULL_NAME),
            Self::List(inner) => write!(f, "{LIST_PREFIX}{inner}>"),
            Self::Entity(name) => f.write_str(name),
        }
    }
}

impl FromStr for TypeTag {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ScalarKind> for TypeTag {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

///
/// TypeTagError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TypeTagError {
    #[error("type name is empty")]
    Empty,

    #[error("type name '{name}' is malformed")]
    Malformed { name: String },

    #[error("type name nests deeper than {max} levels")]
    TooDeep { max: usize },
}
