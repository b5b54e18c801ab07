//! Error types for schema declaration and key resolution.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building schemas or resolving record keys.
///
/// Coercion never fails; only schema construction and key resolution do.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The schema declaration is inconsistent (e.g. primary key names a
    /// field that does not exist).
    #[error("invalid schema '{entity}': {reason}")]
    InvalidSchema { entity: String, reason: String },

    /// A record cannot produce a canonical key.
    #[error("schema violation in '{entity}': primary key field '{field}' {reason}")]
    KeyViolation {
        entity: String,
        field: String,
        reason: String,
    },

    /// A field name was referenced that the schema does not declare.
    #[error("unknown field '{field}' on '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
