use indexmap::IndexMap;
use normstore_types::EntityName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered mapping from field name to descriptor.
pub type Fields = IndexMap<String, Field>;

/// Describes how a raw input value becomes a record attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Field {
    /// Plain attribute; `default` is used when the input omits the field.
    Attr {
        #[serde(default)]
        default: Value,
    },
    /// Nested object coerced recursively against its own field set.
    Nested { fields: Fields },
    /// Reference to another entity type, resolved by foreign key at query
    /// time. Stored records hold `null` for relation fields.
    Relation(Relation),
}

impl Field {
    /// Shorthand for an attribute with the given default.
    pub fn attr(default: impl Into<Value>) -> Self {
        Self::Attr {
            default: default.into(),
        }
    }

    /// Shorthand for an attribute that defaults to `null`.
    pub fn nullable() -> Self {
        Self::Attr {
            default: Value::Null,
        }
    }

    /// Shorthand for a nested sub-schema.
    pub fn nested<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        Self::Nested {
            fields: fields.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }

    /// Shorthand for a one-to-one relation where the related record carries
    /// the foreign key.
    pub fn has_one(related: impl Into<EntityName>, foreign_key: &str) -> Self {
        Self::Relation(Relation::new(RelationKind::HasOne, related, [foreign_key]))
    }

    /// Shorthand for a one-to-many relation where the related records carry
    /// the foreign key.
    pub fn has_many(related: impl Into<EntityName>, foreign_key: &str) -> Self {
        Self::Relation(Relation::new(RelationKind::HasMany, related, [foreign_key]))
    }

    /// Shorthand for an inverse relation where this record carries the
    /// foreign key.
    pub fn belongs_to(related: impl Into<EntityName>, foreign_key: &str) -> Self {
        Self::Relation(Relation::new(RelationKind::BelongsTo, related, [foreign_key]))
    }

    /// Returns the default value for an attribute, or `None` otherwise.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Self::Attr { default } => Some(default),
            _ => None,
        }
    }

    /// The relation descriptor, if this is a relation field.
    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Self::Relation(r) => Some(r),
            _ => None,
        }
    }

    /// The sub-fields, if this is a nested field.
    pub fn as_nested(&self) -> Option<&Fields> {
        match self {
            Self::Nested { fields } => Some(fields),
            _ => None,
        }
    }

    /// Whether this is a plain attribute.
    pub fn is_attr(&self) -> bool {
        matches!(self, Self::Attr { .. })
    }
}

/// The cardinality and direction of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    HasOne,
    BelongsTo,
    HasMany,
}

impl RelationKind {
    /// Whether the relation resolves to a sequence rather than one record.
    pub fn is_many(self) -> bool {
        matches!(self, Self::HasMany)
    }
}

/// A join between an owning record and records of another entity type.
///
/// For `HasOne`/`HasMany`, `foreign_key` names fields on the related entity
/// compared against `local_key` on the owner (owner primary key when unset).
/// For `BelongsTo`, `foreign_key` names fields on the owner compared against
/// `local_key` on the related entity (related primary key when unset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub related: EntityName,
    pub foreign_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_key: Option<Vec<String>>,
}

impl Relation {
    /// A relation of `kind` to `related`, joined on `foreign_key`.
    pub fn new<I, S>(kind: RelationKind, related: impl Into<EntityName>, foreign_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            related: related.into(),
            foreign_key: foreign_key.into_iter().map(Into::into).collect(),
            local_key: None,
        }
    }

    /// Overrides the key the foreign key is compared against.
    #[must_use]
    pub fn with_local_key<I, S>(mut self, local_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_key = Some(local_key.into_iter().map(Into::into).collect());
        self
    }
}

impl From<Relation> for Field {
    fn from(relation: Relation) -> Self {
        Self::Relation(relation)
    }
}
