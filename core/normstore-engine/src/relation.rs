//! Relation resolution by foreign-key equality.
//!
//! Keys on both sides of a join are compared in canonical string form, so
//! `1` and `"1"` match.

use crate::error::StoreResult;
use crate::instance::{Entity, Related};
use crate::registry::Registry;
use normstore_model::{join_key, Record, Relation, RelationKind, Schema};
use normstore_storage::Snapshot;

/// Resolves `relation` for one owning record against a table snapshot.
///
/// `HasOne`/`HasMany` look for related records whose foreign key equals the
/// owner's local key; `BelongsTo` looks for the related record whose key
/// equals the owner's foreign key. One-to-one relations take the first match
/// in table order.
pub fn resolve(
    registry: &Registry,
    snapshot: &Snapshot,
    owner_schema: &Schema,
    owner: &Record,
    relation: &Relation,
) -> StoreResult<Related> {
    let related_schema = registry.get(relation.related.as_str())?;
    let table = snapshot.table(relation.related.as_str())?;

    let (owner_fields, related_fields): (&[String], &[String]) = match relation.kind {
        RelationKind::BelongsTo => (
            &relation.foreign_key,
            relation
                .local_key
                .as_deref()
                .unwrap_or_else(|| related_schema.primary_key().fields()),
        ),
        RelationKind::HasOne | RelationKind::HasMany => (
            relation
                .local_key
                .as_deref()
                .unwrap_or_else(|| owner_schema.primary_key().fields()),
            &relation.foreign_key,
        ),
    };

    let Some(owner_key) = join_key(owner, owner_fields) else {
        return Ok(empty(relation.kind));
    };

    let hydrate = |(key, record): (&normstore_model::CanonicalKey, &Record)| {
        Entity::new(related_schema.clone(), key.clone(), record.clone())
    };

    // Joining on the related primary key is a direct lookup.
    if related_fields == related_schema.primary_key().fields() {
        let found = table
            .get(owner_key.as_str())
            .map(|record| hydrate((&owner_key, record)));
        return Ok(match relation.kind {
            RelationKind::HasMany => Related::Many(found.into_iter().collect()),
            RelationKind::HasOne | RelationKind::BelongsTo => Related::One(found.map(Box::new)),
        });
    }

    let mut matches = table
        .iter()
        .filter(|(_, record)| join_key(record, related_fields).as_ref() == Some(&owner_key))
        .map(hydrate);

    Ok(match relation.kind {
        RelationKind::HasMany => Related::Many(matches.collect()),
        RelationKind::HasOne | RelationKind::BelongsTo => Related::One(matches.next().map(Box::new)),
    })
}

fn empty(kind: RelationKind) -> Related {
    if kind.is_many() {
        Related::Many(Vec::new())
    } else {
        Related::One(None)
    }
}
