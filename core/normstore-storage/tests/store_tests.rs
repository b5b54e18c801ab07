use normstore_model::{coerce, resolve_key, CanonicalKey, EntityName, Field, Record, Schema};
use normstore_storage::{MemoryStore, NormalizedTable, StateStore, StorageError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn user_schema() -> Schema {
    Schema::builder("users")
        .field("id", Field::nullable())
        .field("name", Field::attr(""))
        .build()
        .unwrap()
}

fn keyed(schema: &Schema, value: Value) -> (CanonicalKey, Record) {
    let record = coerce(schema, &value);
    let key = resolve_key(schema, &record).unwrap();
    (key, record)
}

fn users_table(ids: &[i64]) -> NormalizedTable {
    let schema = user_schema();
    ids.iter()
        .map(|id| keyed(&schema, json!({"id": id, "name": format!("user-{id}")})))
        .collect()
}

fn store_with(entities: &[&str]) -> MemoryStore {
    let store = MemoryStore::new();
    for name in entities {
        store.register(&EntityName::new(*name)).unwrap();
    }
    store
}

// ── NormalizedTable ──────────────────────────────────────────────

#[test]
fn table_iterates_in_insertion_order() {
    let table = users_table(&[3, 1, 2]);
    let keys: Vec<_> = table.keys().map(CanonicalKey::as_str).collect();
    assert_eq!(keys, vec!["3", "1", "2"]);
}

#[test]
fn table_replace_keeps_position() {
    let schema = user_schema();
    let mut table = users_table(&[1, 2, 3]);
    let (key, record) = keyed(&schema, json!({"id": 2, "name": "Christina"}));
    let previous = table.insert(key, record);
    assert_eq!(previous.unwrap().get("name"), Some(&json!("user-2")));
    assert_eq!(table.position("2"), Some(1));
    assert_eq!(table.get("2").unwrap().get("name"), Some(&json!("Christina")));
}

#[test]
fn table_remove_preserves_order_of_rest() {
    let mut table = users_table(&[1, 2, 3]);
    assert!(table.remove("2").is_some());
    assert!(table.remove("2").is_none());
    let keys: Vec<_> = table.keys().map(CanonicalKey::as_str).collect();
    assert_eq!(keys, vec!["1", "3"]);
}

#[test]
fn table_retain_filters_records() {
    let mut table = users_table(&[1, 2, 3, 4]);
    table.retain(|_, r| r.get("id").and_then(Value::as_i64).is_some_and(|id| id % 2 == 0));
    assert_eq!(table.len(), 2);
    assert!(table.contains_key("2"));
    assert!(table.contains_key("4"));
}

#[test]
fn table_serializes_under_data() {
    let table = users_table(&[1]);
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json, json!({"data": {"1": {"id": 1, "name": "user-1"}}}));
}

#[test]
fn table_deserializes_from_state_layout() {
    let table: NormalizedTable =
        serde_json::from_value(json!({"data": {"1_1": {"user_id": 1, "vote_id": 1}}})).unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.get("1_1").is_some());
}

#[test]
fn table_from_iter_keeps_last_duplicate_at_first_position() {
    let schema = user_schema();
    let table: NormalizedTable = vec![
        keyed(&schema, json!({"id": 1, "name": "a"})),
        keyed(&schema, json!({"id": 2, "name": "b"})),
        keyed(&schema, json!({"id": 1, "name": "c"})),
    ]
    .into_iter()
    .collect();
    assert_eq!(table.len(), 2);
    assert_eq!(table.position("1"), Some(0));
    assert_eq!(table.get("1").unwrap().get("name"), Some(&json!("c")));
}

// ── MemoryStore ──────────────────────────────────────────────────

#[test]
fn registered_entity_starts_empty() {
    let store = store_with(&["users"]);
    assert!(store.read_table("users").unwrap().is_empty());
}

#[test]
fn register_twice_keeps_existing_table() {
    let store = store_with(&["users"]);
    store.apply_table("users", users_table(&[1])).unwrap();
    store.register(&EntityName::new("users")).unwrap();
    assert_eq!(store.read_table("users").unwrap().len(), 1);
}

#[test]
fn entity_names_in_registration_order() {
    let store = store_with(&["users", "posts", "comments"]);
    let names: Vec<_> = store
        .entity_names()
        .unwrap()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["users", "posts", "comments"]);
}

#[test]
fn read_unknown_entity_fails() {
    let store = store_with(&["users"]);
    let err = store.read_table("ghosts").unwrap_err();
    assert!(matches!(err, StorageError::UnknownEntity(ref name) if name == "ghosts"));
}

#[test]
fn apply_unknown_entity_fails() {
    let store = store_with(&["users"]);
    assert!(store.apply_table("ghosts", NormalizedTable::new()).is_err());
}

#[test]
fn apply_replaces_whole_table() {
    let store = store_with(&["users"]);
    store.apply_table("users", users_table(&[1, 2])).unwrap();
    store.apply_table("users", users_table(&[3])).unwrap();
    let table = store.read_table("users").unwrap();
    let keys: Vec<_> = table.keys().map(CanonicalKey::as_str).collect();
    assert_eq!(keys, vec!["3"]);
}

#[test]
fn reader_keeps_pre_commit_view() {
    let store = store_with(&["users"]);
    store.apply_table("users", users_table(&[1])).unwrap();
    let before = store.read_table("users").unwrap();
    store.apply_table("users", users_table(&[1, 2])).unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(store.read_table("users").unwrap().len(), 2);
}

#[test]
fn snapshot_shares_tables() {
    let store = store_with(&["users", "posts"]);
    store.apply_table("users", users_table(&[1])).unwrap();
    let snapshot = store.snapshot().unwrap();
    let live = store.read_table("users").unwrap();
    assert!(std::ptr::eq(snapshot.table("users").unwrap(), Arc::as_ptr(&live)));
    assert!(snapshot.table("posts").unwrap().is_empty());
    assert!(snapshot.table("ghosts").is_err());
}

#[test]
fn snapshot_renders_state_tree() {
    let store = store_with(&["users", "posts"]);
    store.apply_table("users", users_table(&[2])).unwrap();
    let json = store.snapshot().unwrap().to_json().unwrap();
    assert_eq!(
        json,
        json!({
            "users": {"data": {"2": {"id": 2, "name": "user-2"}}},
            "posts": {"data": {}}
        })
    );
}
