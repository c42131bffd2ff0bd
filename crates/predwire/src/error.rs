use derive_more::Display;
use predwire_core::{
    config::ConfigError,
    error::{ErrorKind as CoreErrorKind, PredicateError},
    expr::{EvalError, ExprError},
    serialize::SerializeError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Wrap a predicate failure raised on the given side of the round trip.
    pub fn predicate(err: PredicateError, origin: ErrorOrigin) -> Self {
        let kind = PredicateErrorKind::from(err.kind());

        Self::new(ErrorKind::Predicate(kind), origin, err.to_string())
    }

    pub(crate) fn encode(err: PredicateError) -> Self {
        Self::predicate(err, ErrorOrigin::Encode)
    }

    pub(crate) fn decode(err: PredicateError) -> Self {
        Self::predicate(err, ErrorOrigin::Decode)
    }
}

impl From<SerializeError> for Error {
    fn from(err: SerializeError) -> Self {
        Self::new(ErrorKind::Transport, ErrorOrigin::Serialize, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<ExprError> for Error {
    fn from(err: ExprError) -> Self {
        Self::new(ErrorKind::Build, ErrorOrigin::Expr, err.to_string())
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Self::new(ErrorKind::Evaluate, ErrorOrigin::Eval, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Predicate(PredicateErrorKind),

    /// Bytes or text could not be produced or parsed.
    Transport,

    /// Limits failed to parse or validate.
    Config,

    /// A host expression was not type-consistent.
    Build,

    /// A compiled predicate failed at runtime.
    Evaluate,
}

///
/// PredicateErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PredicateErrorKind {
    UnsupportedExpressionShape,
    UnknownNodeKind,
    MalformedDocument,
    TypeResolutionFailure,
    MethodResolutionFailure,
}

impl From<CoreErrorKind> for PredicateErrorKind {
    fn from(kind: CoreErrorKind) -> Self {
        match kind {
            CoreErrorKind::UnsupportedExpressionShape => Self::UnsupportedExpressionShape,
            CoreErrorKind::UnknownNodeKind => Self::UnknownNodeKind,
            CoreErrorKind::MalformedDocument => Self::MalformedDocument,
            CoreErrorKind::TypeResolutionFailure => Self::TypeResolutionFailure,
            CoreErrorKind::MethodResolutionFailure => Self::MethodResolutionFailure,
        }
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Decode,
    Encode,
    Eval,
    Expr,
    Serialize,
}
