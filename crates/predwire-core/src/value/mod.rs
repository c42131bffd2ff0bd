mod compare;
mod tag;


use crate::types::{Float64, Ulid};
use std::collections::BTreeMap;

// re-exports
pub use compare::strict_order_cmp;
pub use tag::{MAX_TYPE_NESTING, TypeTag, TypeTagError};

///
/// Value
///
/// Runtime value flowing through host predicates.
///
/// Null    → absent value; conforms only to `TypeTag::Null`.
/// Record  → entity instance; never portable as a constant payload.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Bool(bool),
    Float64(Float64),
    Int(i64),
    /// Ordered list of values.
    List(Vec<Self>),
    Null,
    Record(Record),
    Text(String),
    Uint(u64),
    Ulid(Ulid),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    ///
    /// TYPES
    ///

    /// Exact-type check: the value is a faithful instance of `ty`.
    ///
    /// No widening is applied; `Int` never conforms to `Uint`.
    #[must_use]
    pub fn conforms_to(&self, ty: &TypeTag) -> bool {
        use predwire_primitives::ScalarKind as K;

        match (self, ty) {
            (Self::Bool(_), TypeTag::Scalar(K::Bool))
            | (Self::Float64(_), TypeTag::Scalar(K::Float64))
            | (Self::Int(_), TypeTag::Scalar(K::Int))
            | (Self::Text(_), TypeTag::Scalar(K::Text))
            | (Self::Uint(_), TypeTag::Scalar(K::Uint))
            | (Self::Ulid(_), TypeTag::Scalar(K::Ulid))
            | (Self::Null, TypeTag::Null) => true,
            (Self::List(items), TypeTag::List(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (Self::Record(record), TypeTag::Entity(name)) => record.entity() == name,
            _ => false,
        }
    }

    /// Returns true when the value can travel as a constant payload.
    #[must_use]
    pub fn is_portable(&self) -> bool {
        match self {
            Self::Record(_) => false,
            Self::List(items) => items.iter().all(Self::is_portable),
            _ => true,
        }
    }

    /// Short human-readable kind label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Float64(_) => "Float64",
            Self::Int(_) => "Int",
            Self::List(_) => "List",
            Self::Null => "Null",
            Self::Record(_) => "Record",
            Self::Text(_) => "Text",
            Self::Uint(_) => "Uint",
            Self::Ulid(_) => "Ulid",
        }
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        if let Self::Record(record) = self {
            Some(record)
        } else {
            None
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool    => Bool,
    Float64 => Float64,
    i8      => Int,
    i16     => Int,
    i32     => Int,
    i64     => Int,
    &str    => Text,
    String  => Text,
    u8      => Uint,
    u16     => Uint,
    u32     => Uint,
    u64     => Uint,
    Ulid    => Ulid,
    Record  => Record,
}

impl From<Vec<Self>> for Value {
    fn from(vec: Vec<Self>) -> Self {
        Self::List(vec)
    }
}

///
/// Record
///
/// Entity instance: entity name plus named field values.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    entity: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}
