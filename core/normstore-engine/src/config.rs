use crate::error::StoreResult;
use serde::{Deserialize, Serialize};

/// Namespace the host container registers the entity module under.
pub const DEFAULT_NAMESPACE: &str = "entities";

/// Configuration for a [`crate::Database`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Prefix of action and getter paths (`"entities/users/create"`).
    pub namespace: String,
    /// Reject relations whose target entity or join fields are not
    /// registered when the database is built.
    pub validate_relations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            validate_relations: true,
        }
    }
}

impl DatabaseConfig {
    /// Reads a configuration from JSON; omitted keys take their defaults.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
