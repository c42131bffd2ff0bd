#[macro_use]
mod macros;

use std::fmt;

///
/// ScalarKind
///
/// Canonical scalar kind used for shared capability metadata.
/// The portable name of each kind is part of the wire contract.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScalarKind {
    Bool,
    Float64,
    Int,
    Text,
    Uint,
    Ulid,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    /// Stable portable name written into encoded documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        scalar_kind_registry!(name_from_registry, self)
    }

    /// Resolve a portable name back into a scalar kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        scalar_kind_registry!(from_name_from_registry, name)
    }

    /// Return whether this scalar supports arithmetic operators.
    #[must_use]
    pub const fn supports_arithmetic(self) -> bool {
        self.metadata().supports_arithmetic
    }

    /// Return whether this scalar supports equality predicates.
    #[must_use]
    pub const fn supports_equality(self) -> bool {
        self.metadata().supports_equality
    }

    /// Return whether this scalar supports ordering predicates.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        self.metadata().supports_ordering
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared across the core layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScalarMetadata {
    pub supports_arithmetic: bool,
    pub supports_equality: bool,
    pub supports_ordering: bool,
}

/// Ordered list of all scalar kinds in registry order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 6] = scalar_kind_registry!(all_kinds_from_registry);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn portable_names_round_trip_for_every_kind() {
        for kind in ALL_SCALAR_KINDS {
            assert_eq!(ScalarKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn portable_names_are_unique() {
        let names: BTreeSet<_> = ALL_SCALAR_KINDS.iter().map(|kind| kind.name()).collect();
        assert_eq!(names.len(), ALL_SCALAR_KINDS.len());
    }

    #[test]
    fn unknown_name_does_not_resolve() {
        assert_eq!(ScalarKind::from_name("int"), None);
        assert_eq!(ScalarKind::from_name("Decimal"), None);
    }

    #[test]
    fn arithmetic_kinds_are_also_ordered() {
        for kind in ALL_SCALAR_KINDS {
            if kind.supports_arithmetic() {
                assert!(kind.supports_ordering(), "{kind} allows arithmetic without ordering");
            }
        }

        let arithmetic: Vec<_> = ALL_SCALAR_KINDS
            .into_iter()
            .filter(|kind| kind.supports_arithmetic())
            .collect();
        assert_eq!(
            arithmetic,
            [ScalarKind::Float64, ScalarKind::Int, ScalarKind::Uint]
        );
    }
}
