//! Mutation engine - writes coerced, keyed records into normalized tables.
//!
//! Every operation reads one table, builds its full replacement, and commits
//! it with a single [`StateStore::apply_table`]. Coercion and key resolution
//! finish before the commit, so a failing record leaves the table untouched.

use crate::error::StoreResult;
use crate::registry::Registry;
use normstore_model::{
    coerce, merge_coerce, resolve_key, CanonicalKey, EntityName, Record, Schema,
};
use normstore_storage::{NormalizedTable, StateStore};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Predicate over stored records.
pub type Predicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Selects the records an update or delete applies to.
#[derive(Clone)]
pub enum Where {
    /// Exact canonical key match.
    Key(CanonicalKey),
    /// Every record the predicate accepts.
    Predicate(Predicate),
}

impl Where {
    /// Matches the record stored at `key`.
    pub fn key(key: impl Into<CanonicalKey>) -> Self {
        Self::Key(key.into())
    }

    /// Matches every record `f` accepts.
    pub fn predicate(f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    /// Keys of the matching records, in table order.
    fn matching_keys(&self, table: &NormalizedTable) -> Vec<CanonicalKey> {
        match self {
            Self::Key(key) => {
                if table.contains_key(key.as_str()) {
                    vec![key.clone()]
                } else {
                    Vec::new()
                }
            }
            Self::Predicate(f) => table
                .iter()
                .filter(|(_, record)| f(record))
                .map(|(key, _)| key.clone())
                .collect(),
        }
    }
}

impl fmt::Debug for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

macro_rules! where_from_key {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Where {
                fn from(key: $t) -> Self {
                    Self::Key(key.into())
                }
            }
        )*
    };
}

where_from_key!(CanonicalKey, &str, String, i32, i64, u32, u64, usize);

/// Applies mutations to the tables of registered entity types.
pub struct MutationEngine<'a> {
    registry: &'a Registry,
    store: &'a dyn StateStore,
}

impl<'a> MutationEngine<'a> {
    /// Binds an engine to a registry and the store holding its tables.
    pub fn new(registry: &'a Registry, store: &'a dyn StateStore) -> Self {
        Self { registry, store }
    }

    /// Replaces the whole table with records built from `data`.
    ///
    /// `data` may be one object or an array of objects. When two inputs share
    /// a key, the later one wins at the earlier one's position.
    pub fn create(&self, entity: &str, data: &Value) -> StoreResult<Vec<Record>> {
        let schema = self.registry.get(entity)?;
        let rows = keyed_rows(schema, data)?;
        let table: NormalizedTable = rows.into_iter().collect();
        let created: Vec<Record> = table.records().cloned().collect();

        self.store.apply_table(entity, table)?;
        debug!(entity = %entity, count = created.len(), "Created records");
        Ok(created)
    }

    /// Upserts each record by key, fully overwriting any record already
    /// stored at that key. Other records are untouched.
    pub fn insert(&self, entity: &str, data: &Value) -> StoreResult<Vec<Record>> {
        let schema = self.registry.get(entity)?;
        let rows = keyed_rows(schema, data)?;
        let mut table = (*self.store.read_table(entity)?).clone();

        let mut inserted = Vec::with_capacity(rows.len());
        for (key, record) in rows {
            inserted.push(record.clone());
            table.insert(key, record);
        }

        self.store.apply_table(entity, table)?;
        debug!(entity = %entity, count = inserted.len(), "Inserted records");
        Ok(inserted)
    }

    /// Shallow-merges `data` onto every record matching `condition`.
    ///
    /// A record whose key fields change moves to its new key. No match is a
    /// no-op and commits nothing.
    pub fn update(&self, entity: &str, data: &Value, condition: &Where) -> StoreResult<Vec<Record>> {
        let schema = self.registry.get(entity)?;
        let current = self.store.read_table(entity)?;
        let keys = condition.matching_keys(&current);
        if keys.is_empty() {
            debug!(entity = %entity, ?condition, "Update matched no records");
            return Ok(Vec::new());
        }

        let mut changes = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(existing) = current.get(key.as_str()) else {
                continue;
            };
            let merged = merge_coerce(schema, existing, data);
            let new_key = resolve_key(schema, &merged)?;
            changes.push((key, new_key, merged));
        }

        let mut table = (*current).clone();
        let mut updated = Vec::with_capacity(changes.len());
        for (old_key, new_key, record) in changes {
            if old_key != new_key {
                table.remove(old_key.as_str());
                if table.contains_key(new_key.as_str()) {
                    warn!(
                        entity = %entity,
                        from = %old_key,
                        to = %new_key,
                        "Key change overwrote an existing record"
                    );
                }
            }
            updated.push(record.clone());
            table.insert(new_key, record);
        }

        self.store.apply_table(entity, table)?;
        debug!(entity = %entity, count = updated.len(), "Updated records");
        Ok(updated)
    }

    /// Inserts new records and shallow-merges records whose key already
    /// exists.
    pub fn insert_or_update(&self, entity: &str, data: &Value) -> StoreResult<Vec<Record>> {
        let schema = self.registry.get(entity)?;
        let mut table = (*self.store.read_table(entity)?).clone();

        let mut written = Vec::new();
        for row in rows(data) {
            let fresh = coerce(schema, row);
            let key = resolve_key(schema, &fresh)?;
            let record = match table.get(key.as_str()) {
                Some(existing) => merge_coerce(schema, existing, row),
                None => fresh,
            };
            written.push(record.clone());
            table.insert(key, record);
        }

        self.store.apply_table(entity, table)?;
        debug!(entity = %entity, count = written.len(), "Inserted or updated records");
        Ok(written)
    }

    /// Removes every record matching `condition`. No match is a no-op.
    pub fn delete(&self, entity: &str, condition: &Where) -> StoreResult<Vec<Record>> {
        self.registry.get(entity)?;
        let current = self.store.read_table(entity)?;
        let keys = condition.matching_keys(&current);
        if keys.is_empty() {
            debug!(entity = %entity, ?condition, "Delete matched no records");
            return Ok(Vec::new());
        }

        let mut table = (*current).clone();
        let deleted: Vec<Record> = keys
            .iter()
            .filter_map(|key| table.remove(key.as_str()))
            .collect();

        self.store.apply_table(entity, table)?;
        debug!(entity = %entity, count = deleted.len(), "Deleted records");
        Ok(deleted)
    }

    /// Empties one table, or every registered table when `entity` is `None`.
    /// Returns the number of records removed.
    pub fn delete_all(&self, entity: Option<&str>) -> StoreResult<usize> {
        let targets: Vec<EntityName> = match entity {
            Some(name) => vec![self.registry.get(name)?.name().clone()],
            None => self.registry.names().cloned().collect(),
        };

        let mut removed = 0;
        for name in &targets {
            removed += self.store.read_table(name.as_str())?.len();
            self.store.apply_table(name.as_str(), NormalizedTable::new())?;
        }
        debug!(entities = targets.len(), removed, "Deleted all records");
        Ok(removed)
    }
}

/// Splits a payload into its rows: an array yields its elements, anything
/// else is a single row.
fn rows(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Coerces and keys every row, failing before any table is touched.
fn keyed_rows(schema: &Schema, data: &Value) -> StoreResult<Vec<(CanonicalKey, Record)>> {
    rows(data)
        .into_iter()
        .map(|row| {
            let record = coerce(schema, row);
            let key = resolve_key(schema, &record)?;
            Ok((key, record))
        })
        .collect()
}
