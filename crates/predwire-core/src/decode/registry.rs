use crate::{
    expr::{ParamId, ParameterExpr},
    value::TypeTag,
};

///
/// ParameterRegistry
///
/// One decode's parameter table. Each distinct (name, type) pair maps to a
/// single `ParameterExpr`; declarations and references that name the same
/// pair receive the same id.
///
/// Allocate a fresh registry per root decode. Ids are dense and assigned
/// in first-sight order.
///

#[derive(Debug, Default)]
pub struct ParameterRegistry {
    entries: Vec<ParameterExpr>,
}

impl ParameterRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up the shared parameter for `(name, ty)`, creating it on first sight.
    pub fn resolve(&mut self, name: &str, ty: &TypeTag) -> ParameterExpr {
        if let Some(existing) = self.get(name, ty) {
            return existing.clone();
        }

        let param = ParameterExpr {
            id: ParamId(u32::try_from(self.entries.len()).unwrap_or(u32::MAX)),
            name: name.to_string(),
            ty: ty.clone(),
        };
        self.entries.push(param.clone());

        param
    }

    #[must_use]
    pub fn get(&self, name: &str, ty: &TypeTag) -> Option<&ParameterExpr> {
        self.entries
            .iter()
            .find(|param| param.name == name && &param.ty == ty)
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterExpr] {
        &self.entries
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_and_type_share_one_instance() {
        let mut registry = ParameterRegistry::new();
        let first = registry.resolve("m", &TypeTag::entity("Person"));
        let again = registry.resolve("m", &TypeTag::entity("Person"));

        assert_eq!(first, again);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn type_is_part_of_the_key() {
        let mut registry = ParameterRegistry::new();
        let text = registry.resolve("x", &TypeTag::TEXT);
        let int = registry.resolve("x", &TypeTag::INT);

        assert_ne!(text.id, int.id);
        assert_eq!(
            registry
                .parameters()
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>(),
            vec![ParamId(0), ParamId(1)]
        );
    }
}
