//! Coercion of raw input into schema-shaped records.
//!
//! Coercion is total: unknown keys are dropped, absent fields take their
//! defaults, and input of the wrong shape degrades to defaults instead of
//! failing.

use crate::field::{Field, Fields};
use crate::record::Record;
use crate::schema::Schema;
use serde_json::Value;

/// Produces a record with exactly `schema`'s declared fields.
///
/// A field present in `input` keeps its value, including an explicit `null`.
/// Nested fields are coerced recursively; relation fields are always `null`.
pub fn coerce(schema: &Schema, input: &Value) -> Record {
    coerce_fields(schema.fields(), input)
}

/// Shallow-merges `patch` onto `existing` and coerces the result.
///
/// Top-level keys in `patch` replace the existing value wholesale (a nested
/// object is not merged key-by-key); every other field is retained.
pub fn merge_coerce(schema: &Schema, existing: &Record, patch: &Value) -> Record {
    let mut merged = existing.clone();
    if let Some(patch) = patch.as_object() {
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
    }
    coerce(schema, &Value::Object(merged))
}

fn coerce_fields(fields: &Fields, input: &Value) -> Record {
    let source = input.as_object();
    let mut record = Record::new();
    for (name, field) in fields {
        let supplied = source.and_then(|obj| obj.get(name));
        let value = match field {
            Field::Attr { default } => supplied.cloned().unwrap_or_else(|| default.clone()),
            Field::Nested { fields } => {
                Value::Object(coerce_fields(fields, supplied.unwrap_or(&Value::Null)))
            }
            Field::Relation(_) => Value::Null,
        };
        record.insert(name.clone(), value);
    }
    record
}
