use crate::error::ModelResult;
use crate::schema::Schema;
use serde::de::DeserializeOwned;

/// A caller-defined struct bound to an entity type.
///
/// Implementing `Model` lets a struct register its own schema and receive
/// query results as typed values instead of raw records:
///
/// ```
/// use normstore_model::{Field, Model, ModelResult, Schema};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for User {
///     const ENTITY: &'static str = "users";
///
///     fn schema() -> ModelResult<Schema> {
///         Schema::builder(Self::ENTITY)
///             .field("id", Field::nullable())
///             .field("name", Field::attr(""))
///             .build()
///     }
/// }
/// ```
pub trait Model: DeserializeOwned {
    /// Entity type name the model's records are stored under.
    const ENTITY: &'static str;

    /// Declares the model's fields and primary key.
    fn schema() -> ModelResult<Schema>;
}
