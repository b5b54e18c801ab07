//! In-memory state container for normstore.
//!
//! Holds one [`NormalizedTable`] per registered entity type and exposes the
//! two primitives the mutation and query engines are written against:
//! a whole-table commit ([`StateStore::apply_table`]) and a table read
//! ([`StateStore::read_table`]).
//!
//! # Architecture
//!
//! - Tables map canonical keys to coerced records, in insertion order
//! - Tables are immutable once committed; a commit swaps in a new `Arc`
//! - [`MemoryStore`] is the bundled host; any other container can implement
//!   [`StateStore`]

mod error;
mod store;
mod table;

pub use error::{StorageError, StorageResult};
pub use store::{MemoryStore, Snapshot, StateStore};
pub use table::NormalizedTable;
