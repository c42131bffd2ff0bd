//! ## Crate layout
//! - `core`: node grammar, codec, encoder/decoder, host predicate layer.
//! - `error`: the stable public error type.
//!
//! The helpers at the crate root cover the common path: host lambda to
//! bytes or JSON and back. Reach into `core` for node trees, documents,
//! metrics, or the host evaluator directly.

pub mod error;


pub use predwire_core as core;

pub use error::{Error, ErrorKind, ErrorOrigin, PredicateErrorKind};

use predwire_core::{
    codec::Document, config::PredicateConfig, decode, directory::TypeDirectory, encode,
    error::PredicateError, expr::LambdaExpr, serialize,
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::{Error, ErrorKind};
}

/// Encode a predicate lambda to CBOR bytes.
pub fn encode_to_bytes(lambda: &LambdaExpr) -> Result<Vec<u8>, Error> {
    encode_to_bytes_with_config(lambda, &PredicateConfig::default())
}

pub fn encode_to_bytes_with_config(
    lambda: &LambdaExpr,
    config: &PredicateConfig,
) -> Result<Vec<u8>, Error> {
    let doc = encode_document(lambda, config)?;

    Ok(serialize::to_cbor(&doc)?)
}

/// Decode CBOR bytes into a type-checked predicate lambda.
pub fn decode_from_bytes(
    bytes: &[u8],
    directory: &dyn TypeDirectory,
) -> Result<LambdaExpr, Error> {
    decode_from_bytes_with_config(bytes, directory, &PredicateConfig::default())
}

pub fn decode_from_bytes_with_config(
    bytes: &[u8],
    directory: &dyn TypeDirectory,
    config: &PredicateConfig,
) -> Result<LambdaExpr, Error> {
    config.validate()?;
    let doc: Document = serialize::from_cbor_bounded(bytes, config.max_document_bytes)
        .map_err(|err| Error::decode(PredicateError::from(err)))?;

    decode::decode_document_with_config(&doc, directory, config).map_err(Error::decode)
}

/// Encode a predicate lambda to JSON text.
pub fn encode_to_json(lambda: &LambdaExpr) -> Result<String, Error> {
    encode_to_json_with_config(lambda, &PredicateConfig::default())
}

pub fn encode_to_json_with_config(
    lambda: &LambdaExpr,
    config: &PredicateConfig,
) -> Result<String, Error> {
    let doc = encode_document(lambda, config)?;

    Ok(serialize::to_json(&doc)?)
}

/// Decode JSON text into a type-checked predicate lambda.
pub fn decode_from_json(text: &str, directory: &dyn TypeDirectory) -> Result<LambdaExpr, Error> {
    decode_from_json_with_config(text, directory, &PredicateConfig::default())
}

pub fn decode_from_json_with_config(
    text: &str,
    directory: &dyn TypeDirectory,
    config: &PredicateConfig,
) -> Result<LambdaExpr, Error> {
    config.validate()?;
    let doc: Document = serialize::from_json_bounded(text, config.max_document_bytes)
        .map_err(|err| Error::decode(PredicateError::from(err)))?;

    decode::decode_document_with_config(&doc, directory, config).map_err(Error::decode)
}

fn encode_document(lambda: &LambdaExpr, config: &PredicateConfig) -> Result<Document, Error> {
    config.validate()?;
    let node = encode::encode_with_config(lambda, config).map_err(Error::encode)?;

    Ok(predwire_core::codec::write_lambda(&node))
}
