//! Shared fixtures for engine tests.

#![allow(dead_code)]

use normstore_engine::{Database, Field, MemoryStore, Model, ModelError, Registry, Schema};
use serde::Deserialize;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn user_schema() -> Schema {
    Schema::builder("users")
        .field("id", Field::nullable())
        .field("name", Field::attr(""))
        .field("profile", Field::has_one("profiles", "user_id"))
        .field("posts", Field::has_many("posts", "user_id"))
        .build()
        .unwrap()
}

pub fn profile_schema() -> Schema {
    Schema::builder("profiles")
        .field("id", Field::nullable())
        .field("user_id", Field::nullable())
        .field("age", Field::attr(0))
        .build()
        .unwrap()
}

pub fn post_schema() -> Schema {
    Schema::builder("posts")
        .field("id", Field::nullable())
        .field("user_id", Field::nullable())
        .field("title", Field::attr(""))
        .field("author", Field::belongs_to("users", "user_id"))
        .field("comments", Field::has_many("comments", "post_id"))
        .build()
        .unwrap()
}

pub fn comment_schema() -> Schema {
    Schema::builder("comments")
        .field("id", Field::nullable())
        .field("post_id", Field::nullable())
        .field("body", Field::attr(""))
        .build()
        .unwrap()
}

pub fn composite_key_schema() -> Schema {
    Schema::builder("compositeKeys")
        .field("user_id", Field::nullable())
        .field("vote_id", Field::nullable())
        .field("text", Field::attr(""))
        .primary_key(["user_id", "vote_id"])
        .build()
        .unwrap()
}

pub fn all_schemas() -> Vec<Schema> {
    vec![
        user_schema(),
        profile_schema(),
        post_schema(),
        comment_schema(),
        composite_key_schema(),
    ]
}

/// A database with every fixture entity registered.
pub fn create_database() -> Database {
    init_tracing();
    all_schemas()
        .into_iter()
        .fold(Database::builder(), |builder, schema| builder.register(schema))
        .build()
        .unwrap()
}

/// A registry plus store for driving the engines without a `Database`.
pub fn registry_and_store() -> (Registry, MemoryStore) {
    use normstore_engine::StateStore;

    init_tracing();
    let mut registry = Registry::new();
    let store = MemoryStore::new();
    for schema in all_schemas() {
        store.register(schema.name()).unwrap();
        registry.register(schema).unwrap();
    }
    (registry, store)
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub posts: Option<Vec<Post>>,
}

impl Model for User {
    const ENTITY: &'static str = "users";

    fn schema() -> Result<Schema, ModelError> {
        Ok(user_schema())
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}
