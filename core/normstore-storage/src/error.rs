//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The entity type has no table in the store.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// A lock guarding the tables was poisoned by a panicking writer.
    #[error("poisoned lock: {0}")]
    LockPoisoned(&'static str),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
