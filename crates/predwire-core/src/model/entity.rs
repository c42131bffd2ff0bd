use crate::{
    model::field::FieldModel,
    value::{TypeTag, Value},
};

///
/// EntityModel
/// Minimal runtime model for one entity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityModel {
    /// Stable external name used in portable type tags.
    pub name: String,
    /// Ordered field list (authoritative for member resolution).
    pub fields: Vec<FieldModel>,
}

impl EntityModel {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field declaration.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: TypeTag) -> Self {
        self.fields.push(FieldModel::new(name, ty));
        self
    }

    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::Entity(self.name.clone())
    }
}

///
/// EntityValue
///
/// Implemented by host structs that predicates are evaluated against.
/// `to_value` must produce a `Value::Record` for `model().name`.
///

pub trait EntityValue {
    fn model() -> EntityModel
    where
        Self: Sized;

    fn to_value(&self) -> Value;
}
