//! Actions - the dispatchable form of every mutation.
//!
//! Actions can be built directly or parsed from host-style paths:
//! `"entities/create"` takes the entity from the payload,
//! `"entities/users/create"` names it in the path.

use crate::error::{StoreError, StoreResult};
use crate::mutation::Where;
use normstore_model::{EntityName, Record};
use serde_json::Value;

/// A mutation addressed by entity type name.
#[derive(Debug, Clone)]
pub enum Action {
    Create { entity: EntityName, data: Value },
    Insert { entity: EntityName, data: Value },
    InsertOrUpdate { entity: EntityName, data: Value },
    Update {
        entity: EntityName,
        data: Value,
        condition: Where,
    },
    Delete { entity: EntityName, condition: Where },
    /// `None` empties every registered entity type.
    DeleteAll { entity: Option<EntityName> },
}

impl Action {
    /// Operation this action performs.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Create { .. } => ActionKind::Create,
            Self::Insert { .. } => ActionKind::Insert,
            Self::InsertOrUpdate { .. } => ActionKind::InsertOrUpdate,
            Self::Update { .. } => ActionKind::Update,
            Self::Delete { .. } => ActionKind::Delete,
            Self::DeleteAll { .. } => ActionKind::DeleteAll,
        }
    }
}

/// What a completed action touched.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Records created, written, updated or deleted, in table order.
    Records(Vec<Record>),
    /// Number of records removed by a delete-all.
    Cleared(usize),
}

impl ActionOutcome {
    /// Records the action touched; empty for a delete-all.
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Records(records) => records,
            Self::Cleared(_) => &[],
        }
    }

    /// Number of records the action affected.
    pub fn affected(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Cleared(n) => *n,
        }
    }
}

/// Operation named by the last segment of an action path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Insert,
    InsertOrUpdate,
    Update,
    Delete,
    DeleteAll,
}

impl ActionKind {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "create" => Self::Create,
            "insert" => Self::Insert,
            "insertOrUpdate" | "insert_or_update" => Self::InsertOrUpdate,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "deleteAll" | "delete_all" => Self::DeleteAll,
            _ => return None,
        })
    }
}

/// A parsed action path: optional entity scope plus operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPath {
    pub entity: Option<EntityName>,
    pub kind: ActionKind,
}

impl ActionPath {
    /// Parses `"<namespace>/<op>"` or `"<namespace>/<entity>/<op>"`.
    pub fn parse(namespace: &str, path: &str) -> StoreResult<Self> {
        let invalid = || StoreError::InvalidAction(format!("unrecognized action path '{path}'"));
        let rest = path
            .strip_prefix(namespace)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(invalid)?;

        let (entity, op) = match rest.split('/').collect::<Vec<_>>().as_slice() {
            [op] => (None, *op),
            [entity, op] => (Some(EntityName::parse(entity).map_err(|_| invalid())?), *op),
            _ => return Err(invalid()),
        };
        let kind = ActionKind::parse(op).ok_or_else(invalid)?;
        Ok(Self { entity, kind })
    }
}

/// Arguments of a path-addressed action.
///
/// `Payload::default()` is the empty options object.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub entity: Option<EntityName>,
    pub data: Option<Value>,
    pub condition: Option<Where>,
}

impl Payload {
    /// An empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entity(mut self, entity: impl Into<EntityName>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the `where` clause: a key or a [`Where::predicate`].
    #[must_use]
    pub fn condition(mut self, condition: impl Into<Where>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Builds the action for `path`. A path-scoped entity takes precedence
    /// over `payload.entity`.
    pub fn into_action(self, path: ActionPath) -> StoreResult<Action> {
        let entity = path.entity.or(self.entity);
        if path.kind == ActionKind::DeleteAll {
            return Ok(Action::DeleteAll { entity });
        }

        let entity = entity.ok_or_else(|| {
            StoreError::InvalidAction(format!("{:?} requires an entity", path.kind))
        })?;
        let data = || {
            self.data.clone().ok_or_else(|| {
                StoreError::InvalidAction(format!("{:?} requires data", path.kind))
            })
        };
        let condition = || {
            self.condition.clone().ok_or_else(|| {
                StoreError::InvalidAction(format!("{:?} requires a where clause", path.kind))
            })
        };

        Ok(match path.kind {
            ActionKind::Create => Action::Create { entity, data: data()? },
            ActionKind::Insert => Action::Insert { entity, data: data()? },
            ActionKind::InsertOrUpdate => Action::InsertOrUpdate { entity, data: data()? },
            ActionKind::Update => Action::Update {
                entity,
                data: data()?,
                condition: condition()?,
            },
            ActionKind::Delete => Action::Delete {
                entity,
                condition: condition()?,
            },
            ActionKind::DeleteAll => Action::DeleteAll { entity: Some(entity) },
        })
    }
}
