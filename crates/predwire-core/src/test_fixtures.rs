use crate::{
    directory::TypeRegistry,
    model::{EntityModel, EntityValue},
    value::{Record, TypeTag, Value},
};

///
/// Person
///

#[derive(Clone, Debug)]
pub(crate) struct Person {
    pub(crate) name: &'static str,
    pub(crate) age: i64,
    pub(crate) tags: Vec<&'static str>,
    pub(crate) orders: Vec<Order>,
}

impl Person {
    pub(crate) fn new(name: &'static str, age: i64) -> Self {
        Self {
            name,
            age,
            tags: Vec::new(),
            orders: Vec::new(),
        }
    }

    pub(crate) fn tagged(mut self, tags: &[&'static str]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub(crate) fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }
}

impl EntityValue for Person {
    fn model() -> EntityModel {
        EntityModel::new("Person")
            .field("Name", TypeTag::TEXT)
            .field("Age", TypeTag::INT)
            .field("Tags", TypeTag::list(TypeTag::TEXT))
            .field("Orders", TypeTag::list(TypeTag::entity("Order")))
    }

    fn to_value(&self) -> Value {
        Value::Record(
            Record::new("Person")
                .with("Name", self.name)
                .with("Age", self.age)
                .with("Tags", Value::from_list(self.tags.clone()))
                .with(
                    "Orders",
                    Value::List(self.orders.iter().map(EntityValue::to_value).collect()),
                ),
        )
    }
}

///
/// Order
///

#[derive(Clone, Debug)]
pub(crate) struct Order {
    pub(crate) sku: &'static str,
    pub(crate) total: i64,
}

impl EntityValue for Order {
    fn model() -> EntityModel {
        EntityModel::new("Order")
            .field("Sku", TypeTag::TEXT)
            .field("Total", TypeTag::INT)
    }

    fn to_value(&self) -> Value {
        Value::Record(
            Record::new("Order")
                .with("Sku", self.sku)
                .with("Total", self.total),
        )
    }
}

pub(crate) fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register_entity::<Person>()
        .expect("Person registers");
    registry
        .register_entity::<Order>()
        .expect("Order registers");

    registry
}

pub(crate) fn person_tag() -> TypeTag {
    TypeTag::entity("Person")
}
