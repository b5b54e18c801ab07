//! Core identifier types for normstore.
//!
//! This crate defines the two names every other layer speaks in:
//! - [`EntityName`] addresses one registered entity type and its table
//! - [`CanonicalKey`] addresses one record inside that table
//!
//! Schema, coercion and query semantics live in `normstore-model` and
//! `normstore-engine`, not here.

mod ids;

pub use ids::{CanonicalKey, EntityName, KEY_SEPARATOR};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid entity name: {0}")]
    InvalidName(String),
}
