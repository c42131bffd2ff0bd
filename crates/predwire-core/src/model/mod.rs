//! Runtime data model definitions.
//!
//! Entity models describe *what can be addressed* by an encoded predicate:
//! the allow-listed entity names and their fields. They are registered into
//! a type directory, which is the only place member names from untrusted
//! documents are resolved.
pub mod entity;
pub mod field;

pub use entity::{EntityModel, EntityValue};
pub use field::FieldModel;
