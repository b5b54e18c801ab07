use crate::error::{ModelError, ModelResult};
use crate::field::{Field, Fields, Relation, RelationKind};
use normstore_types::EntityName;
use serde::{Deserialize, Serialize};

/// Primary key used when a schema does not declare one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Which field(s) identify a record within its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// The key fields, in declared order.
    pub fn fields(&self) -> &[String] {
        match self {
            Self::Single(field) => std::slice::from_ref(field),
            Self::Composite(fields) => fields,
        }
    }

    /// Whether the key spans more than one field.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

impl Default for PrimaryKey {
    fn default() -> Self {
        Self::Single(DEFAULT_PRIMARY_KEY.to_string())
    }
}

impl From<&str> for PrimaryKey {
    fn from(field: &str) -> Self {
        Self::Single(field.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for PrimaryKey {
    fn from(fields: [&str; N]) -> Self {
        Self::Composite(fields.iter().map(|f| (*f).to_string()).collect())
    }
}

impl From<Vec<String>> for PrimaryKey {
    fn from(fields: Vec<String>) -> Self {
        Self::Composite(fields)
    }
}

/// Declares an entity type's shape: its fields and primary key.
///
/// A `Schema` is only obtainable through [`SchemaBuilder::build`] or
/// deserialization, both of which validate the primary key against the
/// declared fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef")]
pub struct Schema {
    name: EntityName,
    fields: Fields,
    primary_key: PrimaryKey,
}

/// Unvalidated wire form of a [`Schema`].
#[derive(Debug, Deserialize)]
struct SchemaDef {
    name: EntityName,
    fields: Fields,
    #[serde(default)]
    primary_key: PrimaryKey,
}

impl TryFrom<SchemaDef> for Schema {
    type Error = ModelError;

    fn try_from(def: SchemaDef) -> ModelResult<Self> {
        let schema = Self {
            name: def.name,
            fields: def.fields,
            primary_key: def.primary_key,
        };
        schema.validate()?;
        Ok(schema)
    }
}

impl Schema {
    /// Starts declaring a schema for the named entity type.
    pub fn builder(name: impl Into<EntityName>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Fields::new(),
            primary_key: PrimaryKey::default(),
        }
    }

    /// Parses and validates a schema from its JSON form.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Entity type name.
    pub fn name(&self) -> &EntityName {
        &self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Descriptor of one field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Primary key specification.
    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }

    /// Iterates the relation fields in declaration order.
    pub fn relations(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.as_relation().map(|r| (name.as_str(), r)))
    }

    /// Looks up a relation field by name.
    pub fn relation(&self, name: &str) -> ModelResult<&Relation> {
        self.fields
            .get(name)
            .and_then(Field::as_relation)
            .ok_or_else(|| ModelError::UnknownField {
                entity: self.name.to_string(),
                field: name.to_string(),
            })
    }

    fn invalid(&self, reason: impl Into<String>) -> ModelError {
        ModelError::InvalidSchema {
            entity: self.name.to_string(),
            reason: reason.into(),
        }
    }

    fn validate(&self) -> ModelResult<()> {
        let key_fields = self.primary_key.fields();
        if key_fields.is_empty() {
            return Err(self.invalid("primary key must name at least one field"));
        }
        for (i, key) in key_fields.iter().enumerate() {
            if key_fields[..i].contains(key) {
                return Err(self.invalid(format!("primary key field '{key}' is repeated")));
            }
            match self.fields.get(key) {
                Some(field) if field.is_attr() => {}
                Some(_) => {
                    return Err(self.invalid(format!(
                        "primary key field '{key}' must be a plain attribute"
                    )));
                }
                None => {
                    return Err(self.invalid(format!(
                        "primary key field '{key}' is not declared"
                    )));
                }
            }
        }

        for (name, relation) in self.relations() {
            if relation.foreign_key.is_empty() {
                return Err(self.invalid(format!("relation '{name}' has no foreign key")));
            }
            // The owner side of the join must exist on this schema.
            let owner_fields: &[String] = match relation.kind {
                RelationKind::BelongsTo => &relation.foreign_key,
                RelationKind::HasOne | RelationKind::HasMany => relation
                    .local_key
                    .as_deref()
                    .unwrap_or_else(|| self.primary_key.fields()),
            };
            if let Some(missing) = owner_fields
                .iter()
                .find(|f| !self.fields.get(*f).is_some_and(Field::is_attr))
            {
                return Err(self.invalid(format!(
                    "relation '{name}' joins on '{missing}', which is not an attribute"
                )));
            }
        }
        Ok(())
    }
}

/// Incrementally declares a [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: EntityName,
    fields: Fields,
    primary_key: PrimaryKey,
}

impl SchemaBuilder {
    /// Adds (or replaces) a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    /// Sets the primary key: a single field name or an array of names.
    #[must_use]
    pub fn primary_key(mut self, key: impl Into<PrimaryKey>) -> Self {
        self.primary_key = key.into();
        self
    }

    /// Validates and returns the schema.
    pub fn build(self) -> ModelResult<Schema> {
        let schema = Schema {
            name: self.name,
            fields: self.fields,
            primary_key: self.primary_key,
        };
        schema.validate()?;
        Ok(schema)
    }
}
