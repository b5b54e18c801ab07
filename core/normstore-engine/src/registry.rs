//! Registered schemas, keyed by entity type name.

use crate::error::{StoreError, StoreResult};
use indexmap::IndexMap;
use normstore_model::{EntityName, Field, RelationKind, Schema};
use std::sync::Arc;

/// The set of entity types a database knows about.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: IndexMap<EntityName, Arc<Schema>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema; names must be unique.
    pub fn register(&mut self, schema: Schema) -> StoreResult<()> {
        let name = schema.name().clone();
        if self.schemas.contains_key(&name) {
            return Err(StoreError::DuplicateEntity(name.to_string()));
        }
        self.schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Schema registered under `entity`.
    pub fn get(&self, entity: &str) -> StoreResult<&Arc<Schema>> {
        self.schemas
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    /// Whether `entity` is registered.
    pub fn contains(&self, entity: &str) -> bool {
        self.schemas.contains_key(entity)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &EntityName> {
        self.schemas.keys()
    }

    /// Number of registered entity types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no entity type is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Checks that every relation targets a registered entity and that the
    /// related side of each join names attributes of that entity.
    pub fn validate_relations(&self) -> StoreResult<()> {
        for schema in self.schemas.values() {
            for (field, relation) in schema.relations() {
                let invalid = |reason: String| StoreError::InvalidRelation {
                    entity: schema.name().to_string(),
                    field: field.to_string(),
                    reason,
                };
                let related = self.schemas.get(&relation.related).ok_or_else(|| {
                    invalid(format!("related entity '{}' is not registered", relation.related))
                })?;
                let related_fields: &[String] = match relation.kind {
                    RelationKind::BelongsTo => relation
                        .local_key
                        .as_deref()
                        .unwrap_or_else(|| related.primary_key().fields()),
                    RelationKind::HasOne | RelationKind::HasMany => &relation.foreign_key,
                };
                let owner_width = match relation.kind {
                    RelationKind::BelongsTo => relation.foreign_key.len(),
                    RelationKind::HasOne | RelationKind::HasMany => relation
                        .local_key
                        .as_ref()
                        .map_or_else(|| schema.primary_key().fields().len(), Vec::len),
                };
                if related_fields.len() != owner_width {
                    return Err(invalid(format!(
                        "joins {owner_width} field(s) against {} on '{}'",
                        related_fields.len(),
                        relation.related
                    )));
                }
                if let Some(missing) = related_fields
                    .iter()
                    .find(|f| !related.field(f).is_some_and(Field::is_attr))
                {
                    return Err(invalid(format!(
                        "'{}' has no attribute '{missing}'",
                        relation.related
                    )));
                }
            }
        }
        Ok(())
    }
}
