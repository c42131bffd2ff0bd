use crate::value::TypeTag;

///
/// FieldModel
/// Runtime field metadata used by member resolution.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in member access.
    pub name: String,
    /// Exact type of the field value.
    pub ty: TypeTag,
}

impl FieldModel {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
