use crate::error::StoreResult;
use indexmap::IndexMap;
use normstore_model::{CanonicalKey, EntityName, Record, RecordExt, Schema};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// A hydrated record, tagged with its schema.
///
/// Instances are built fresh by every query and never written back; they
/// are views over the table as it was when the query ran.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    key: CanonicalKey,
    record: Record,
    loaded: IndexMap<String, Related>,
}

/// The outcome of resolving a relation field.
#[derive(Debug, Clone)]
pub enum Related {
    One(Option<Box<Entity>>),
    Many(Vec<Entity>),
}

impl Entity {
    pub(crate) fn new(schema: Arc<Schema>, key: CanonicalKey, record: Record) -> Self {
        Self {
            schema,
            key,
            record,
            loaded: IndexMap::new(),
        }
    }

    /// Canonical key the record is stored under.
    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    /// Schema the record was coerced against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Name of the instance's entity type.
    pub fn entity_name(&self) -> &EntityName {
        self.schema.name()
    }

    /// The stored record, relation fields as `null`.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Consumes the instance, returning the stored record.
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Stored value of a field. Relation fields read as `null`; use
    /// [`Entity::relation`] for loaded relations.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// String value at a JSON pointer into the record.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.record.get_str(pointer)
    }

    /// Integer value at a JSON pointer into the record.
    pub fn get_i64(&self, pointer: &str) -> Option<i64> {
        self.record.get_i64(pointer)
    }

    /// A relation loaded through `Query::with`.
    pub fn relation(&self, field: &str) -> Option<&Related> {
        self.loaded.get(field)
    }

    pub(crate) fn relation_mut(&mut self, field: &str) -> Option<&mut Related> {
        self.loaded.get_mut(field)
    }

    pub(crate) fn set_relation(&mut self, field: &str, related: Related) {
        self.loaded.insert(field.to_string(), related);
    }

    /// The record as JSON, with loaded relations filled in place of their
    /// `null` placeholders.
    pub fn to_value(&self) -> Value {
        let mut object = self.record.clone();
        for (field, related) in &self.loaded {
            object.insert(field.clone(), related.to_value());
        }
        Value::Object(object)
    }

    /// Deserializes the instance into a caller-defined type.
    pub fn to_model<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl Related {
    /// The single related instance, for one-to-one relations.
    pub fn as_one(&self) -> Option<&Entity> {
        match self {
            Self::One(entity) => entity.as_deref(),
            Self::Many(_) => None,
        }
    }

    /// The related instances; a one-to-one relation yields zero or one.
    pub fn as_many(&self) -> &[Entity] {
        match self {
            Self::One(Some(entity)) => std::slice::from_ref(&**entity),
            Self::One(None) => &[],
            Self::Many(entities) => entities,
        }
    }

    pub(crate) fn entities_mut(&mut self) -> Vec<&mut Entity> {
        match self {
            Self::One(Some(entity)) => vec![&mut **entity],
            Self::One(None) => Vec::new(),
            Self::Many(entities) => entities.iter_mut().collect(),
        }
    }

    /// Number of related instances.
    pub fn len(&self) -> usize {
        self.as_many().len()
    }

    /// Whether no instance is related.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Related instances as JSON: an object, `null`, or an array.
    pub fn to_value(&self) -> Value {
        match self {
            Self::One(Some(entity)) => entity.to_value(),
            Self::One(None) => Value::Null,
            Self::Many(entities) => Value::Array(entities.iter().map(Entity::to_value).collect()),
        }
    }
}
