//! Error types for the particle field core.

use thiserror::Error;

/// Errors that can occur when updating field parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    /// A parameter value is outside its accepted domain
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Particle count text that is not a positive integer
    #[error("invalid particle count: {0:?}")]
    InvalidParticleCount(String),
}

impl FieldError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Result alias for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;
