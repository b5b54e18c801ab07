//! Database - the explicit context tying schemas, store and engines together.

use crate::action::{Action, ActionOutcome, ActionPath, Payload};
use crate::config::DatabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::instance::Entity;
use crate::mutation::{MutationEngine, Where};
use crate::query::Query;
use crate::registry::Registry;
use normstore_model::{EntityName, Model, Record, Schema};
use normstore_storage::{MemoryStore, Snapshot, StateStore};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Registered entity types over one state store.
///
/// Mutations are dispatched as async tasks and serialized by a write gate;
/// each runs to completion without suspending once the gate is held.
/// Queries are synchronous reads of a snapshot.
pub struct Database {
    config: DatabaseConfig,
    registry: Arc<Registry>,
    store: Arc<dyn StateStore>,
    write_gate: Mutex<()>,
}

/// Collects schemas and settings for a [`Database`].
#[derive(Default)]
pub struct DatabaseBuilder {
    config: DatabaseConfig,
    schemas: Vec<Schema>,
    store: Option<Arc<dyn StateStore>>,
}

impl DatabaseBuilder {
    #[must_use]
    pub fn config(mut self, config: DatabaseConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `store` as the state container instead of a fresh
    /// [`MemoryStore`].
    #[must_use]
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn register(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Registers the schema declared by `M`.
    pub fn register_model<M: Model>(self) -> StoreResult<Self> {
        Ok(self.register(M::schema()?))
    }

    /// Validates the schemas and registers a table for each.
    pub fn build(self) -> StoreResult<Database> {
        let mut registry = Registry::new();
        for schema in self.schemas {
            registry.register(schema)?;
        }
        if self.config.validate_relations {
            registry.validate_relations()?;
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn StateStore>);
        for name in registry.names() {
            store.register(name)?;
        }

        info!(
            namespace = %self.config.namespace,
            entities = registry.len(),
            "Database initialized"
        );
        Ok(Database {
            config: self.config,
            registry: Arc::new(registry),
            store,
            write_gate: Mutex::new(()),
        })
    }
}

impl Database {
    /// Starts configuring a database.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// Settings the database was built with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Schemas registered with the database.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Schema of a registered entity type.
    pub fn schema(&self, entity: &str) -> StoreResult<&Arc<Schema>> {
        self.registry.get(entity)
    }

    /// The underlying state container.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Runs one action to completion.
    pub async fn dispatch(&self, action: Action) -> StoreResult<ActionOutcome> {
        let _gate = self.write_gate.lock().await;
        debug!(kind = ?action.kind(), "Dispatching action");
        let engine = MutationEngine::new(&self.registry, self.store.as_ref());

        Ok(match &action {
            Action::Create { entity, data } => {
                ActionOutcome::Records(engine.create(entity.as_str(), data)?)
            }
            Action::Insert { entity, data } => {
                ActionOutcome::Records(engine.insert(entity.as_str(), data)?)
            }
            Action::InsertOrUpdate { entity, data } => {
                ActionOutcome::Records(engine.insert_or_update(entity.as_str(), data)?)
            }
            Action::Update {
                entity,
                data,
                condition,
            } => ActionOutcome::Records(engine.update(entity.as_str(), data, condition)?),
            Action::Delete { entity, condition } => {
                ActionOutcome::Records(engine.delete(entity.as_str(), condition)?)
            }
            Action::DeleteAll { entity } => {
                ActionOutcome::Cleared(engine.delete_all(entity.as_ref().map(EntityName::as_str))?)
            }
        })
    }

    /// Dispatches a host-style action path such as `"entities/update"` or
    /// `"entities/users/create"`.
    pub async fn dispatch_path(&self, path: &str, payload: Payload) -> StoreResult<ActionOutcome> {
        let path = ActionPath::parse(&self.config.namespace, path)?;
        let action = payload.into_action(path)?;
        self.dispatch(action).await
    }

    pub async fn create(&self, entity: &str, data: Value) -> StoreResult<Vec<Record>> {
        let outcome = self
            .dispatch(Action::Create {
                entity: entity.into(),
                data,
            })
            .await?;
        Ok(into_records(outcome))
    }

    pub async fn insert(&self, entity: &str, data: Value) -> StoreResult<Vec<Record>> {
        let outcome = self
            .dispatch(Action::Insert {
                entity: entity.into(),
                data,
            })
            .await?;
        Ok(into_records(outcome))
    }

    pub async fn insert_or_update(&self, entity: &str, data: Value) -> StoreResult<Vec<Record>> {
        let outcome = self
            .dispatch(Action::InsertOrUpdate {
                entity: entity.into(),
                data,
            })
            .await?;
        Ok(into_records(outcome))
    }

    pub async fn update(
        &self,
        entity: &str,
        data: Value,
        condition: impl Into<Where>,
    ) -> StoreResult<Vec<Record>> {
        let outcome = self
            .dispatch(Action::Update {
                entity: entity.into(),
                data,
                condition: condition.into(),
            })
            .await?;
        Ok(into_records(outcome))
    }

    pub async fn delete(&self, entity: &str, condition: impl Into<Where>) -> StoreResult<Vec<Record>> {
        let outcome = self
            .dispatch(Action::Delete {
                entity: entity.into(),
                condition: condition.into(),
            })
            .await?;
        Ok(into_records(outcome))
    }

    /// Empties `entity`'s table, or every table when `entity` is `None`.
    pub async fn delete_all(&self, entity: Option<&str>) -> StoreResult<usize> {
        let outcome = self
            .dispatch(Action::DeleteAll {
                entity: entity.map(EntityName::from),
            })
            .await?;
        Ok(outcome.affected())
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Starts a query over `entity`, reading the tables as they are now.
    pub fn query(&self, entity: &str) -> StoreResult<Query> {
        Query::new(self.registry.clone(), self.store.snapshot()?, entity)
    }

    /// Starts a query over the entity type bound to `M`.
    pub fn query_model<M: Model>(&self) -> StoreResult<Query> {
        self.query(M::ENTITY)
    }

    /// Resolves a getter path `"<namespace>/<entity>"` to a query.
    pub fn getter(&self, path: &str) -> StoreResult<Query> {
        match self.parse_getter(path)? {
            (entity, None) => self.query(entity),
            (_, Some(_)) => Err(unrecognized_getter(path)),
        }
    }

    /// Calls a record getter: `"<namespace>/<entity>/all"` returns every
    /// instance of the entity in table order.
    pub fn fetch_path(&self, path: &str) -> StoreResult<Vec<Entity>> {
        match self.parse_getter(path)? {
            (entity, Some("all")) => self.query(entity)?.all(),
            _ => Err(unrecognized_getter(path)),
        }
    }

    /// Splits a getter path into its entity and optional getter name.
    fn parse_getter<'p>(&self, path: &'p str) -> StoreResult<(&'p str, Option<&'p str>)> {
        let rest = path
            .strip_prefix(self.config.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| unrecognized_getter(path))?;
        match rest.split('/').collect::<Vec<_>>().as_slice() {
            [entity] if !entity.is_empty() => Ok((*entity, None)),
            [entity, name] if !entity.is_empty() && !name.is_empty() => {
                Ok((*entity, Some(*name)))
            }
            _ => Err(unrecognized_getter(path)),
        }
    }

    /// Every table as it is now.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        Ok(self.store.snapshot()?)
    }
}

fn unrecognized_getter(path: &str) -> StoreError {
    StoreError::InvalidAction(format!("unrecognized getter path '{path}'"))
}

fn into_records(outcome: ActionOutcome) -> Vec<Record> {
    match outcome {
        ActionOutcome::Records(records) => records,
        ActionOutcome::Cleared(_) => Vec::new(),
    }
}
