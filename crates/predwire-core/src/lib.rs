//! Core of predwire: the portable predicate node grammar, its tagged
//! document codec, the encoder/decoder pair, and the small host predicate
//! layer the decoder targets.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod codec;
pub mod config;
pub mod decode;
pub mod directory;
pub mod encode;
pub mod error;
pub mod expr;
pub mod model;
pub mod node;
pub mod obs;
pub mod serialize;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, codecs, serializers, or metrics are re-exported here.
///

pub mod prelude {
    pub use crate::{
        directory::{TypeDirectory, TypeRegistry},
        expr::{BinaryOp, CompiledPredicate, Expr, ExprBuilder, LambdaExpr},
        model::{EntityModel, EntityValue},
        node::{LambdaNode, PredicateNode},
        value::{Record, TypeTag, Value},
    };
}
