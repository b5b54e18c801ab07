use serde_json::{Map, Value};

/// A coerced record: a JSON object whose keys are exactly a schema's fields.
///
/// Records are only produced by [`crate::coerce`]; nothing else assembles one
/// by hand.
pub type Record = Map<String, Value>;

/// JSON-pointer accessors over a record's fields.
pub trait RecordExt {
    /// Looks up a value by JSON pointer (e.g., "/settings/role").
    fn pointer(&self, pointer: &str) -> Option<&Value>;

    /// Extract a string value using a JSON pointer.
    fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(Value::as_str)
    }

    /// Extract a boolean value using a JSON pointer.
    fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.pointer(pointer).and_then(Value::as_bool)
    }

    /// Extract a numeric value using a JSON pointer.
    fn get_number(&self, pointer: &str) -> Option<f64> {
        self.pointer(pointer).and_then(Value::as_f64)
    }

    /// Extract an integer value using a JSON pointer.
    fn get_i64(&self, pointer: &str) -> Option<i64> {
        self.pointer(pointer).and_then(Value::as_i64)
    }
}

impl RecordExt for Record {
    fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return None;
        }
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.split_once('/') {
            Some((head, tail)) => (head, Some(tail)),
            None => (rest, None),
        };
        let head = head.replace("~1", "/").replace("~0", "~");
        let value = self.get(&head)?;
        match tail {
            Some(tail) => value.pointer(&format!("/{tail}")),
            None => Some(value),
        }
    }
}
