//! Error types for the engine layer.

use normstore_model::ModelError;
use normstore_storage::StorageError;
use thiserror::Error;

/// Result type for engine operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while mutating or querying the store.
///
/// No-match cases (update/delete with nothing to touch, a lookup on an absent
/// key) are never errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Schema or key error; aborts the mutation before anything is committed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Error from the state container.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The entity type is not registered with the database.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// Two schemas were registered under one name.
    #[error("entity type registered twice: {0}")]
    DuplicateEntity(String),

    /// A relation path named a field that is not a relation.
    #[error("unknown relation '{field}' on '{entity}'")]
    UnknownRelation { entity: String, field: String },

    /// A relation points at an unregistered entity or joins on missing fields.
    #[error("invalid relation '{field}' on '{entity}': {reason}")]
    InvalidRelation {
        entity: String,
        field: String,
        reason: String,
    },

    /// An action path or payload could not be interpreted.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
