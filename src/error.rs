//! Error types
//!
//! The per-frame physics path never fails: stale handles are neutral no-ops.
//! Only setup work (parsing and validating configuration) returns
//! `Result<T, PhysicsError>`.

use std::fmt;

/// Errors raised while configuring the physics layer
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A configuration value is out of its valid range
    InvalidConfiguration {
        /// Which field was rejected
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
    /// Configuration text could not be parsed
    Deserialization(String),
}

impl PhysicsError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfiguration { field, reason }
    }
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, reason } => {
                write!(f, "invalid configuration for `{field}`: {reason}")
            }
            Self::Deserialization(message) => {
                write!(f, "failed to parse configuration: {message}")
            }
        }
    }
}

impl std::error::Error for PhysicsError {}

impl From<serde_json::Error> for PhysicsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}
