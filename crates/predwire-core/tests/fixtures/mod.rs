//! Shared entity for the integration tests.
#![allow(dead_code)]

use predwire_core::{
    directory::TypeRegistry,
    model::{EntityModel, EntityValue},
    types::{Float64, Ulid},
    value::{Record, TypeTag, Value},
};

///
/// Customer
///

#[derive(Clone, Debug)]
pub struct Customer {
    pub id: Ulid,
    pub name: String,
    pub lastname: String,
    pub age: i64,
    pub visits: u64,
    pub score: Float64,
    pub tags: Vec<String>,
}

impl Customer {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            id: Ulid::nil(),
            name: name.to_string(),
            lastname: String::new(),
            age,
            visits: 0,
            score: Float64::default(),
            tags: Vec::new(),
        }
    }
}

impl EntityValue for Customer {
    fn model() -> EntityModel {
        EntityModel::new("Customer")
            .field("Id", TypeTag::ULID)
            .field("Name", TypeTag::TEXT)
            .field("Lastname", TypeTag::TEXT)
            .field("Age", TypeTag::INT)
            .field("Visits", TypeTag::UINT)
            .field("Score", TypeTag::FLOAT64)
            .field("Tags", TypeTag::list(TypeTag::TEXT))
    }

    fn to_value(&self) -> Value {
        Value::Record(
            Record::new("Customer")
                .with("Id", self.id)
                .with("Name", self.name.as_str())
                .with("Lastname", self.lastname.as_str())
                .with("Age", self.age)
                .with("Visits", self.visits)
                .with("Score", self.score)
                .with("Tags", Value::from_list(self.tags.clone())),
        )
    }
}

pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register_entity::<Customer>()
        .expect("Customer registers");

    registry
}

pub fn customer_tag() -> TypeTag {
    TypeTag::entity("Customer")
}
