//! Mutation and query engine for normstore.
//!
//! Sits between callers and a [`StateStore`]: mutations coerce and key their
//! input, then commit whole tables; queries read a snapshot and hydrate
//! [`Entity`] instances, resolving relations by foreign key.
//!
//! # Architecture
//!
//! - **Registry**: the registered schemas, validated once at build time
//! - **Mutation engine**: create, insert, update, delete, delete-all
//! - **Query engine**: filtering, ordering, paging, eager and lazy relations
//! - **Database**: the context object; dispatches actions behind a write
//!   gate and hands out queries
//!
//! # Example
//!
//! ```
//! use normstore_engine::{Database, Field, Schema};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> normstore_engine::StoreResult<()> {
//! let users = Schema::builder("users")
//!     .field("id", Field::nullable())
//!     .field("name", Field::attr(""))
//!     .build()?;
//! let db = Database::builder().register(users).build()?;
//!
//! db.create("users", json!([{"id": 1, "name": "John"}, {"id": 2}])).await?;
//!
//! let all = db.query("users")?.get()?;
//! assert_eq!(all.len(), 2);
//! assert_eq!(db.query("users")?.first(1)?.unwrap().get_str("/name"), Some("John"));
//! # Ok(())
//! # }
//! ```

mod action;
mod config;
mod database;
mod error;
mod instance;
mod mutation;
mod query;
pub mod registry;
pub mod relation;

pub use action::{Action, ActionKind, ActionOutcome, ActionPath, Payload};
pub use config::{DatabaseConfig, DEFAULT_NAMESPACE};
pub use database::{Database, DatabaseBuilder};
pub use error::{StoreError, StoreResult};
pub use instance::{Entity, Related};
pub use mutation::{MutationEngine, Predicate, Where};
pub use query::{Direction, Query};
pub use registry::Registry;

pub use normstore_model::{
    CanonicalKey, EntityName, Field, Model, ModelError, PrimaryKey, Record, RecordExt, Relation,
    RelationKind, Schema,
};
pub use normstore_storage::{MemoryStore, NormalizedTable, Snapshot, StateStore, StorageError};
