use crate::serialize::SerializeError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// PredicateError
///
/// Failure surfaced by encoding or decoding a predicate. Each variant maps
/// to one stable `ErrorKind`; messages are diagnostic only.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PredicateError {
    /// Encoder met a host construct with no wire representation.
    #[error("unsupported expression shape: {0}")]
    UnsupportedExpressionShape(String),

    #[error("unknown node kind '{kind}'")]
    UnknownNodeKind { kind: String },

    /// Structurally invalid wire data (missing field, bad shape, limits).
    #[error("malformed document at {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("type resolution failed: {0}")]
    TypeResolutionFailure(String),

    #[error("method resolution failed: {0}")]
    MethodResolutionFailure(String),
}

impl PredicateError {
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedExpressionShape(message.into())
    }

    pub(crate) fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownNodeKind { kind: kind.into() }
    }

    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_resolution(message: impl Into<String>) -> Self {
        Self::TypeResolutionFailure(message.into())
    }

    pub(crate) fn method_resolution(message: impl Into<String>) -> Self {
        Self::MethodResolutionFailure(message.into())
    }

    /// Return a stable error kind independent of message text.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedExpressionShape(_) => ErrorKind::UnsupportedExpressionShape,
            Self::UnknownNodeKind { .. } => ErrorKind::UnknownNodeKind,
            Self::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            Self::TypeResolutionFailure(_) => ErrorKind::TypeResolutionFailure,
            Self::MethodResolutionFailure(_) => ErrorKind::MethodResolutionFailure,
        }
    }
}

impl From<SerializeError> for PredicateError {
    fn from(err: SerializeError) -> Self {
        Self::malformed("$", err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    UnsupportedExpressionShape,
    UnknownNodeKind,
    MalformedDocument,
    TypeResolutionFailure,
    MethodResolutionFailure,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedExpressionShape => "unsupported_expression_shape",
            Self::UnknownNodeKind => "unknown_node_kind",
            Self::MalformedDocument => "malformed_document",
            Self::TypeResolutionFailure => "type_resolution_failure",
            Self::MethodResolutionFailure => "method_resolution_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TESTS
///
