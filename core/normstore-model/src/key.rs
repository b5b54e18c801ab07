//! Canonical key resolution.

use crate::error::{ModelError, ModelResult};
use crate::record::Record;
use crate::schema::Schema;
use normstore_types::{CanonicalKey, KEY_SEPARATOR};
use serde_json::Value;

/// Largest magnitude below which every integral `f64` is exact.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// String form of a single key component.
///
/// Strings are used verbatim, numbers in decimal form, booleans as
/// `true`/`false`. Integral floats render without a fraction (`2.0` → `"2"`),
/// so they key the same as the matching integer. `null`, arrays and objects
/// cannot be key components.
pub fn key_component(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_component(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_component(n: &serde_json::Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < MAX_EXACT_FLOAT
    {
        return (f as i64).to_string();
    }
    n.to_string()
}

/// Computes the canonical key of `record` under `schema`'s primary key.
///
/// Fails with [`ModelError::KeyViolation`] when any key component is absent
/// or not a scalar, or when a composite key component contains
/// [`KEY_SEPARATOR`] (the joined key would be ambiguous).
pub fn resolve_key(schema: &Schema, record: &Record) -> ModelResult<CanonicalKey> {
    let fields = schema.primary_key().fields();
    let composite = fields.len() > 1;
    let mut parts = Vec::with_capacity(fields.len());
    for field in fields {
        let violation = |reason: &str| ModelError::KeyViolation {
            entity: schema.name().to_string(),
            field: field.clone(),
            reason: reason.to_string(),
        };
        match record.get(field) {
            None | Some(Value::Null) => return Err(violation("is missing")),
            Some(value) => match key_component(value) {
                Some(part) if composite && part.contains(KEY_SEPARATOR) => {
                    return Err(violation(&format!(
                        "contains the key separator '{KEY_SEPARATOR}'"
                    )));
                }
                Some(part) => parts.push(part),
                None => return Err(violation("is not a scalar value")),
            },
        }
    }
    Ok(CanonicalKey::from_parts(parts))
}

/// Joins arbitrary fields of `record` into canonical key form.
///
/// Returns `None` when any component is absent or not a scalar, or when a
/// multi-field join has a component containing [`KEY_SEPARATOR`]. Used to
/// compare foreign keys against owner keys.
pub fn join_key(record: &Record, fields: &[String]) -> Option<CanonicalKey> {
    let parts = fields
        .iter()
        .map(|f| record.get(f).and_then(key_component))
        .collect::<Option<Vec<_>>>()?;
    if parts.len() > 1 && parts.iter().any(|p| p.contains(KEY_SEPARATOR)) {
        return None;
    }
    Some(CanonicalKey::from_parts(parts))
}
