//! Decode/encode limits.
//!
//! Limits bound the work an untrusted document can demand. They are caller
//! policy and travel with each call, not global state.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// DEFAULTS
///

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_NODES: usize = 4096;
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 256 * 1024;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config value '{field}' must be greater than zero")]
    Zero { field: &'static str },
}

///
/// PredicateConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredicateConfig {
    /// Maximum node nesting, root lambda included.
    pub max_depth: usize,

    /// Maximum total node count in one tree.
    pub max_nodes: usize,

    /// Maximum serialized document size accepted from bytes or text.
    pub max_document_bytes: usize,
}

impl Default for PredicateConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl PredicateConfig {
    /// Parse a TOML table; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Zero { field: "max_depth" });
        }
        if self.max_nodes == 0 {
            return Err(ConfigError::Zero { field: "max_nodes" });
        }
        if self.max_document_bytes == 0 {
            return Err(ConfigError::Zero {
                field: "max_document_bytes",
            });
        }

        Ok(())
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub const fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }
}

///
/// TESTS
///
