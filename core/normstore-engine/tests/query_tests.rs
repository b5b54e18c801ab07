mod common;

use common::{create_database, Post, User};
use normstore_engine::{Database, Direction, Entity, RecordExt, StoreError};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ids(entities: &[Entity]) -> Vec<i64> {
    entities.iter().filter_map(|e| e.get_i64("/id")).collect()
}

async fn seeded() -> Database {
    let db = create_database();
    db.create(
        "users",
        json!([
            {"id": 1, "name": "John"},
            {"id": 2, "name": "Jane"},
            {"id": 3, "name": "Johnny"}
        ]),
    )
    .await
    .unwrap();
    db.create(
        "profiles",
        json!([
            {"id": 10, "user_id": 1, "age": 30},
            {"id": 11, "user_id": "2", "age": 25}
        ]),
    )
    .await
    .unwrap();
    db.create(
        "posts",
        json!([
            {"id": 1, "user_id": 1, "title": "first"},
            {"id": 2, "user_id": 2, "title": "second"},
            {"id": 3, "user_id": 1, "title": "third"}
        ]),
    )
    .await
    .unwrap();
    db.create(
        "comments",
        json!([
            {"id": 1, "post_id": 1, "body": "nice"},
            {"id": 2, "post_id": 1, "body": "agreed"},
            {"id": 3, "post_id": 3, "body": "late"}
        ]),
    )
    .await
    .unwrap();
    db
}

// ── Terminals ────────────────────────────────────────────────────

#[tokio::test]
async fn all_returns_table_order() {
    let db = seeded().await;
    let users = db.query("users").unwrap().all().unwrap();
    assert_eq!(ids(&users), vec![1, 2, 3]);
    assert_eq!(users[0].key().as_str(), "1");
}

#[tokio::test]
async fn empty_table_yields_empty_results() {
    let db = create_database();
    let query = db.query("users").unwrap();
    assert!(query.get().unwrap().is_empty());
    assert_eq!(query.count().unwrap(), 0);
    assert!(!query.exists().unwrap());
    assert!(query.first_matching().unwrap().is_none());
}

#[tokio::test]
async fn first_by_key_accepts_numbers_and_strings() {
    let db = seeded().await;
    let query = db.query("users").unwrap();

    assert_eq!(query.first(2).unwrap().unwrap().get_str("/name"), Some("Jane"));
    assert_eq!(query.first("3").unwrap().unwrap().get_str("/name"), Some("Johnny"));
    assert!(query.first(42).unwrap().is_none());
}

#[tokio::test]
async fn first_by_key_respects_filters() {
    let db = seeded().await;
    let query = db.query("users").unwrap().where_eq("name", "Jane");

    assert!(query.first(1).unwrap().is_none());
    assert!(query.first(2).unwrap().is_some());
}

#[tokio::test]
async fn query_sees_snapshot_from_creation() {
    let db = seeded().await;
    let query = db.query("users").unwrap();

    db.delete_all(Some("users")).await.unwrap();

    assert_eq!(query.count().unwrap(), 3);
    assert_eq!(db.query("users").unwrap().count().unwrap(), 0);
}

#[tokio::test]
async fn unknown_entity_query_fails() {
    let db = create_database();
    assert!(matches!(db.query("ghosts"), Err(StoreError::UnknownEntity(_))));
}

// ── Modifiers ────────────────────────────────────────────────────

#[tokio::test]
async fn filter_and_where_eq_combine() {
    let db = seeded().await;
    let posts = db
        .query("posts")
        .unwrap()
        .where_eq("user_id", 1)
        .filter(|r| r.get_str("/title") != Some("first"))
        .get()
        .unwrap();

    assert_eq!(ids(&posts), vec![3]);
}

#[tokio::test]
async fn order_by_with_tie_breaker() {
    let db = seeded().await;
    let posts = db
        .query("posts")
        .unwrap()
        .order_by("user_id", Direction::Asc)
        .order_by("id", Direction::Desc)
        .get()
        .unwrap();

    assert_eq!(ids(&posts), vec![3, 1, 2]);
}

#[tokio::test]
async fn order_by_string_field_descending() {
    let db = seeded().await;
    let users = db
        .query("users")
        .unwrap()
        .order_by("name", Direction::Desc)
        .get()
        .unwrap();

    assert_eq!(ids(&users), vec![3, 1, 2]);
}

#[tokio::test]
async fn offset_and_limit_page_results() {
    let db = seeded().await;
    let query = db.query("posts").unwrap().offset(1).limit(1);

    assert_eq!(ids(&query.get().unwrap()), vec![2]);
    assert_eq!(query.count().unwrap(), 1);

    let past_end = db.query("posts").unwrap().offset(5);
    assert!(past_end.get().unwrap().is_empty());
    assert_eq!(past_end.count().unwrap(), 0);
}

#[tokio::test]
async fn first_and_last_matching() {
    let db = seeded().await;
    let query = db.query("users").unwrap().filter(|r| {
        r.get_str("/name").is_some_and(|n| n.starts_with("John"))
    });

    assert_eq!(query.first_matching().unwrap().unwrap().get_i64("/id"), Some(1));
    assert_eq!(query.last_matching().unwrap().unwrap().get_i64("/id"), Some(3));
    assert_eq!(query.count().unwrap(), 2);
    assert!(query.exists().unwrap());
}

// ── Relations ────────────────────────────────────────────────────

#[tokio::test]
async fn relation_fields_read_as_null_until_loaded() {
    let db = seeded().await;
    let user = db.query("users").unwrap().first(1).unwrap().unwrap();

    assert_eq!(user.get("posts"), Some(&json!(null)));
    assert!(user.relation("posts").is_none());
}

#[tokio::test]
async fn lazy_has_many() {
    let db = seeded().await;
    let query = db.query("users").unwrap();
    let john = query.first(1).unwrap().unwrap();
    let johnny = query.first(3).unwrap().unwrap();

    assert_eq!(ids(query.related(&john, "posts").unwrap().as_many()), vec![1, 3]);
    assert!(query.related(&johnny, "posts").unwrap().is_empty());
}

#[tokio::test]
async fn lazy_has_one_matches_across_number_and_string_keys() {
    let db = seeded().await;
    let query = db.query("users").unwrap();
    let jane = query.first(2).unwrap().unwrap();

    let profile = query.related(&jane, "profile").unwrap();
    assert_eq!(profile.as_one().unwrap().get_i64("/id"), Some(11));

    let johnny = query.first(3).unwrap().unwrap();
    assert!(query.related(&johnny, "profile").unwrap().as_one().is_none());
}

#[tokio::test]
async fn lazy_belongs_to() {
    let db = seeded().await;
    let query = db.query("posts").unwrap();
    let post = query.first(2).unwrap().unwrap();

    let author = query.related(&post, "author").unwrap();
    assert_eq!(author.as_one().unwrap().get_str("/name"), Some("Jane"));
}

#[tokio::test]
async fn belongs_to_with_null_foreign_key_is_empty() {
    let db = seeded().await;
    db.insert("posts", json!({"id": 9, "title": "orphan"})).await.unwrap();

    let query = db.query("posts").unwrap();
    let orphan = query.first(9).unwrap().unwrap();
    assert!(query.related(&orphan, "author").unwrap().as_one().is_none());
}

#[tokio::test]
async fn eager_nested_relations() {
    let db = seeded().await;
    let user = db
        .query("users")
        .unwrap()
        .with("posts.comments")
        .first(1)
        .unwrap()
        .unwrap();

    let posts = user.relation("posts").unwrap().as_many();
    assert_eq!(ids(posts), vec![1, 3]);
    assert_eq!(ids(posts[0].relation("comments").unwrap().as_many()), vec![1, 2]);
    assert_eq!(ids(posts[1].relation("comments").unwrap().as_many()), vec![3]);
}

#[tokio::test]
async fn with_all_loads_first_level_relations() {
    let db = seeded().await;
    let user = db.query("users").unwrap().with_all().first(1).unwrap().unwrap();

    assert_eq!(
        user.to_value(),
        json!({
            "id": 1,
            "name": "John",
            "profile": {"id": 10, "user_id": 1, "age": 30},
            "posts": [
                {"id": 1, "user_id": 1, "title": "first", "author": null, "comments": null},
                {"id": 3, "user_id": 1, "title": "third", "author": null, "comments": null}
            ]
        })
    );
}

#[tokio::test]
async fn with_unknown_relation_fails() {
    let db = seeded().await;
    let err = db.query("users").unwrap().with("name").get().unwrap_err();

    assert!(matches!(
        err,
        StoreError::UnknownRelation { ref entity, ref field } if entity == "users" && field == "name"
    ));
}

// ── Typed models ─────────────────────────────────────────────────

#[tokio::test]
async fn get_as_deserializes_loaded_relations() {
    let db = seeded().await;
    let users: Vec<User> = db
        .query_model::<User>()
        .unwrap()
        .with("posts")
        .limit(2)
        .get_as()
        .unwrap();

    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                name: "John".into(),
                posts: Some(vec![
                    Post { id: 1, user_id: 1, title: "first".into() },
                    Post { id: 3, user_id: 1, title: "third".into() },
                ]),
            },
            User {
                id: 2,
                name: "Jane".into(),
                posts: Some(vec![Post { id: 2, user_id: 2, title: "second".into() }]),
            },
        ]
    );
}

#[tokio::test]
async fn to_model_without_loaded_relations() {
    let db = seeded().await;
    let user: User = db.query("users").unwrap().first(3).unwrap().unwrap().to_model().unwrap();
    assert_eq!(
        user,
        User { id: 3, name: "Johnny".into(), posts: None }
    );
}

#[tokio::test]
async fn entity_serializes_with_relations() {
    let db = seeded().await;
    let post = db.query("posts").unwrap().with("author").first(2).unwrap().unwrap();

    let value = serde_json::to_value(&post).unwrap();
    assert_eq!(value["author"]["name"], json!("Jane"));
    assert_eq!(value["comments"], json!(null));
}
