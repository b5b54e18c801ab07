use crate::error::{StorageError, StorageResult};
use crate::table::NormalizedTable;
use indexmap::IndexMap;
use normstore_model::EntityName;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// The host state container, seen through the two primitives the engine
/// needs: a whole-table commit and a table read.
///
/// Implementations must make `apply_table` atomic with respect to
/// `read_table`: a reader observes either the previous table or the new one.
pub trait StateStore: Send + Sync {
    /// Adds an empty table for `entity`. Registering twice is a no-op.
    fn register(&self, entity: &EntityName) -> StorageResult<()>;

    /// Names of every registered entity type, in registration order.
    fn entity_names(&self) -> StorageResult<Vec<EntityName>>;

    /// Returns the current table for `entity`.
    fn read_table(&self, entity: &str) -> StorageResult<Arc<NormalizedTable>>;

    /// Replaces the table for `entity` with `table`.
    fn apply_table(&self, entity: &str, table: NormalizedTable) -> StorageResult<()>;

    /// Reads every registered table at once.
    fn snapshot(&self) -> StorageResult<Snapshot> {
        let mut tables = IndexMap::new();
        for name in self.entity_names()? {
            let table = self.read_table(name.as_str())?;
            tables.insert(name, table);
        }
        Ok(Snapshot { tables })
    }
}

/// Point-in-time view of every table, shared by reference.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    tables: IndexMap<EntityName, Arc<NormalizedTable>>,
}

impl Snapshot {
    /// Table for `entity` as captured.
    pub fn table(&self, entity: &str) -> StorageResult<&NormalizedTable> {
        self.tables
            .get(entity)
            .map(AsRef::as_ref)
            .ok_or_else(|| StorageError::UnknownEntity(entity.to_string()))
    }

    /// Entity names in the snapshot, in registration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &EntityName> {
        self.tables.keys()
    }

    /// Renders the state tree: entity name → `{"data": {...}}`.
    pub fn to_json(&self) -> StorageResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// In-process [`StateStore`] holding each table behind an `Arc`.
///
/// Commits swap the `Arc` under a short write lock, so readers holding an
/// older table keep a consistent view.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<IndexMap<EntityName, Arc<NormalizedTable>>>,
}

impl MemoryStore {
    /// A store with no registered tables.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn register(&self, entity: &EntityName) -> StorageResult<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("tables"))?;
        tables.entry(entity.clone()).or_default();
        Ok(())
    }

    fn entity_names(&self) -> StorageResult<Vec<EntityName>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("tables"))?;
        Ok(tables.keys().cloned().collect())
    }

    fn read_table(&self, entity: &str) -> StorageResult<Arc<NormalizedTable>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("tables"))?;
        tables
            .get(entity)
            .cloned()
            .ok_or_else(|| StorageError::UnknownEntity(entity.to_string()))
    }

    fn apply_table(&self, entity: &str, table: NormalizedTable) -> StorageResult<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("tables"))?;
        let slot = tables
            .get_mut(entity)
            .ok_or_else(|| StorageError::UnknownEntity(entity.to_string()))?;
        debug!(entity = %entity, records = table.len(), "Applied table");
        *slot = Arc::new(table);
        Ok(())
    }
}
