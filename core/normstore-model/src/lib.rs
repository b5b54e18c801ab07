//! Schema and record model for normstore.
//!
//! Defines the types every mutation and query flows through:
//! - [`Field`] / [`Relation`]: how a raw value becomes an attribute, nested
//!   object, or relation reference
//! - [`Schema`]: an entity type's ordered fields plus its primary key
//! - [`coerce`]: turns arbitrary JSON into a [`Record`] shaped exactly like
//!   a schema
//! - [`resolve_key`]: derives a record's [`CanonicalKey`], joining composite
//!   keys with `_`
//! - [`Model`]: binds a caller's struct to a schema for typed retrieval

mod coerce;
mod error;
mod field;
mod key;
mod model;
mod record;
mod schema;

pub use coerce::{coerce, merge_coerce};
pub use error::{ModelError, ModelResult};
pub use field::{Field, Fields, Relation, RelationKind};
pub use key::{join_key, key_component, resolve_key};
pub use model::Model;
pub use normstore_types::{CanonicalKey, EntityName, KEY_SEPARATOR};
pub use record::{Record, RecordExt};
pub use schema::{PrimaryKey, Schema, SchemaBuilder, DEFAULT_PRIMARY_KEY};
