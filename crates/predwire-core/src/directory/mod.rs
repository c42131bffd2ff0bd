//! Type directory: the only authority that turns portable names from an
//! encoded predicate into host types, members, and methods.
//!
//! Resolution is deterministic and allow-listed. Nothing outside the
//! registered entity models and the static builtin tables is reachable.

pub mod builtin;


use crate::{
    model::{EntityModel, EntityValue},
    value::{TypeTag, TypeTagError},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

// re-exports
pub use builtin::{
    BuiltinMember, InstanceMethod, ReceiverKind, SequenceOp, SequenceOpKind, Shape,
};

///
/// MemberAccess
///

#[derive(Clone, Copy, Debug)]
pub enum MemberAccess {
    /// Named field read from a `Value::Record`.
    Field,
    Builtin(&'static BuiltinMember),
}

impl PartialEq for MemberAccess {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Field, Self::Field) => true,
            (Self::Builtin(a), Self::Builtin(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for MemberAccess {}

///
/// ResolvedMember
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedMember {
    pub name: String,
    pub ty: TypeTag,
    pub access: MemberAccess,
}

///
/// TypeDirectory
///
/// Resolution seam used by the builder and the decoder.
///

pub trait TypeDirectory {
    /// Canonical host type for `ty`, or `None` when it is not allow-listed.
    fn resolve_type(&self, ty: &TypeTag) -> Option<TypeTag>;

    fn resolve_member(&self, target: &TypeTag, member: &str) -> Option<ResolvedMember>;

    /// Instance method on `receiver` whose parameters match `args` exactly.
    fn resolve_method(
        &self,
        receiver: &TypeTag,
        method: &str,
        args: &[TypeTag],
    ) -> Option<(&'static InstanceMethod, TypeTag)>;

    /// Sequence-operation candidates by name and arity (unspecialized).
    fn sequence_ops(&self, method: &str, arity: usize) -> Vec<&'static SequenceOp>;

    /// Look up a type by its portable name.
    fn resolve_type_name(&self, name: &str) -> Result<Option<TypeTag>, TypeTagError> {
        let tag = TypeTag::parse(name)?;
        Ok(self.resolve_type(&tag))
    }
}

///
/// RegistryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error("entity '{0}' is already registered")]
    DuplicateEntity(String),

    #[error("entity name '{0}' is not a valid portable identifier")]
    InvalidName(String),

    #[error("entity '{entity}' declares field '{field}' more than once")]
    DuplicateField { entity: String, field: String },
}

///
/// TypeRegistry
///
/// Default directory: registered entity models plus the builtin tables.
///

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    entities: BTreeMap<String, EntityModel>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with_entity(mut self, model: EntityModel) -> Result<Self, RegistryError> {
        self.register(model)?;
        Ok(self)
    }

    pub fn register_entity<E: EntityValue>(&mut self) -> Result<(), RegistryError> {
        self.register(E::model())
    }

    pub fn register(&mut self, model: EntityModel) -> Result<(), RegistryError> {
        // an entity name must parse back to itself as an entity tag
        match TypeTag::parse(&model.name) {
            Ok(TypeTag::Entity(_)) => {}
            _ => return Err(RegistryError::InvalidName(model.name)),
        }

        for (i, field) in model.fields.iter().enumerate() {
            if model.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(RegistryError::DuplicateField {
                    entity: model.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if self.entities.contains_key(&model.name) {
            return Err(RegistryError::DuplicateEntity(model.name));
        }

        self.entities.insert(model.name.clone(), model);
        Ok(())
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }
}

impl TypeDirectory for TypeRegistry {
    fn resolve_type(&self, ty: &TypeTag) -> Option<TypeTag> {
        match ty {
            TypeTag::Scalar(_) | TypeTag::Null => Some(ty.clone()),
            TypeTag::List(element) => self.resolve_type(element).map(TypeTag::list),
            TypeTag::Entity(name) => self.entities.get(name).map(EntityModel::type_tag),
        }
    }

    fn resolve_member(&self, target: &TypeTag, member: &str) -> Option<ResolvedMember> {
        if let TypeTag::Entity(name) = target {
            let field = self.entities.get(name)?.find_field(member)?;

            return Some(ResolvedMember {
                name: field.name.clone(),
                ty: field.ty.clone(),
                access: MemberAccess::Field,
            });
        }

        let def = builtin::find_member(target, member)?;
        let element = def.receiver.accepts(target)?;
        let ty = def.result.specialize(element)?;

        Some(ResolvedMember {
            name: def.name.to_string(),
            ty,
            access: MemberAccess::Builtin(def),
        })
    }

    fn resolve_method(
        &self,
        receiver: &TypeTag,
        method: &str,
        args: &[TypeTag],
    ) -> Option<(&'static InstanceMethod, TypeTag)> {
        builtin::INSTANCE_METHODS
            .iter()
            .filter(|def| def.name == method)
            .find_map(|def| def.bind(receiver, args).map(|result| (def, result)))
    }

    fn sequence_ops(&self, method: &str, arity: usize) -> Vec<&'static SequenceOp> {
        builtin::SEQUENCE_OPS
            .iter()
            .filter(|op| op.name == method && op.params.len() == arity)
            .collect()
    }
}
