//! Query engine - reads a table snapshot and hydrates entity instances.
//!
//! A [`Query`] captures every table when it is created and never writes
//! back. Modifiers apply in a fixed order: filters, ordering, offset, limit;
//! relations named with [`Query::with`] are loaded onto the surviving
//! instances.

use crate::error::{StoreError, StoreResult};
use crate::instance::{Entity, Related};
use crate::mutation::Predicate;
use crate::registry::Registry;
use crate::relation;
use normstore_model::{CanonicalKey, Record, Schema};
use normstore_storage::{NormalizedTable, Snapshot};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// A chainable read over one entity type.
#[derive(Clone)]
pub struct Query {
    registry: Arc<Registry>,
    snapshot: Snapshot,
    schema: Arc<Schema>,
    filters: Vec<Predicate>,
    orders: Vec<(String, Direction)>,
    offset: usize,
    limit: Option<usize>,
    with: Vec<String>,
}

impl Query {
    pub(crate) fn new(registry: Arc<Registry>, snapshot: Snapshot, entity: &str) -> StoreResult<Self> {
        let schema = registry.get(entity)?.clone();
        Ok(Self {
            registry,
            snapshot,
            schema,
            filters: Vec::new(),
            orders: Vec::new(),
            offset: 0,
            limit: None,
            with: Vec::new(),
        })
    }

    /// Schema of the queried entity type.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    // ── Modifiers ────────────────────────────────────────────────

    /// Keeps records the predicate accepts. Filters combine with AND.
    #[must_use]
    pub fn filter(mut self, f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(Arc::new(f));
        self
    }

    /// Keeps records whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        let field = field.to_string();
        let value = value.into();
        self.filter(move |record| record.get(&field) == Some(&value))
    }

    /// Sorts by `field`; later calls break ties of earlier ones.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.orders.push((field.to_string(), direction));
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Eager-loads a relation path such as `"posts"` or `"posts.comments"`.
    #[must_use]
    pub fn with(mut self, path: &str) -> Self {
        self.with.push(path.to_string());
        self
    }

    /// Eager-loads every first-level relation of the entity.
    #[must_use]
    pub fn with_all(mut self) -> Self {
        let names: Vec<String> = self.schema.relations().map(|(name, _)| name.to_string()).collect();
        self.with.extend(names);
        self
    }

    // ── Terminals ────────────────────────────────────────────────

    /// Every matching instance, in table order unless ordered.
    pub fn get(&self) -> StoreResult<Vec<Entity>> {
        let table = self.table()?;
        let mut rows: Vec<(&CanonicalKey, &Record)> = table
            .iter()
            .filter(|(_, record)| self.accepts(record))
            .collect();

        if !self.orders.is_empty() {
            rows.sort_by(|(_, a), (_, b)| self.compare(a, b));
        }

        let rows = rows
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX));

        rows.map(|(key, record)| self.hydrate(key, record)).collect()
    }

    /// Alias of [`Query::get`].
    pub fn all(&self) -> StoreResult<Vec<Entity>> {
        self.get()
    }

    /// The instance stored at `key`, if present and accepted by the filters.
    pub fn first(&self, key: impl Into<CanonicalKey>) -> StoreResult<Option<Entity>> {
        let key = key.into();
        let table = self.table()?;
        match table.get(key.as_str()) {
            Some(record) if self.accepts(record) => self.hydrate(&key, record).map(Some),
            _ => Ok(None),
        }
    }

    /// The first instance after all modifiers.
    pub fn first_matching(&self) -> StoreResult<Option<Entity>> {
        Ok(self.clone().limit(1).get()?.into_iter().next())
    }

    /// The last instance after all modifiers.
    pub fn last_matching(&self) -> StoreResult<Option<Entity>> {
        Ok(self.get()?.pop())
    }

    /// Number of instances [`Query::get`] would return.
    pub fn count(&self) -> StoreResult<usize> {
        let matched = self.table()?.records().filter(|r| self.accepts(r)).count();
        let after_offset = matched.saturating_sub(self.offset);
        Ok(self.limit.map_or(after_offset, |limit| after_offset.min(limit)))
    }

    /// Whether any instance matches.
    pub fn exists(&self) -> StoreResult<bool> {
        Ok(self.count()? > 0)
    }

    /// Every matching instance, deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        self.get()?.iter().map(Entity::to_model).collect()
    }

    /// Resolves one relation of `entity` on demand, against this query's
    /// snapshot.
    pub fn related(&self, entity: &Entity, field: &str) -> StoreResult<Related> {
        let schema = entity.schema();
        let relation = schema.field(field).and_then(|f| f.as_relation()).ok_or_else(|| {
            StoreError::UnknownRelation {
                entity: schema.name().to_string(),
                field: field.to_string(),
            }
        })?;
        relation::resolve(&self.registry, &self.snapshot, schema, entity.record(), relation)
    }

    // ── Internals ────────────────────────────────────────────────

    fn table(&self) -> StoreResult<&NormalizedTable> {
        Ok(self.snapshot.table(self.schema.name().as_str())?)
    }

    fn accepts(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f(record))
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for (field, direction) in &self.orders {
            let ordering = compare_values(
                a.get(field).unwrap_or(&Value::Null),
                b.get(field).unwrap_or(&Value::Null),
            );
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn hydrate(&self, key: &CanonicalKey, record: &Record) -> StoreResult<Entity> {
        let mut entity = Entity::new(self.schema.clone(), key.clone(), record.clone());
        for path in &self.with {
            let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
            self.load_path(&mut entity, &segments)?;
        }
        Ok(entity)
    }

    fn load_path(&self, entity: &mut Entity, path: &[&str]) -> StoreResult<()> {
        let Some((head, rest)) = path.split_first() else {
            return Ok(());
        };
        if entity.relation(head).is_none() {
            let related = self.related(entity, head)?;
            entity.set_relation(head, related);
        }
        if rest.is_empty() {
            return Ok(());
        }
        if let Some(related) = entity.relation_mut(head) {
            for inner in related.entities_mut() {
                self.load_path(inner, rest)?;
            }
        }
        Ok(())
    }
}

/// Total order over JSON values: null < bool < number < string < array <
/// object. Arrays and objects compare equal among themselves.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
