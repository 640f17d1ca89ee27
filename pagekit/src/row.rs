//! Field access over repository rows.

use crate::Value;

/// A row returned by a repository.
///
/// The cursor codec reads sort-key values through [`field`](Row::field);
/// the in-memory repository also evaluates predicates with it.
pub trait Row {
    /// Value of a named field, `None` when the row has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Identifiers of the rows associated with this one through `relation`
    /// (e.g. the tag ids of a post). Empty by default.
    fn related_ids(&self, relation: &str) -> Vec<i64> {
        let _ = relation;
        Vec::new()
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn related_ids(&self, relation: &str) -> Vec<i64> {
        (**self).related_ids(relation)
    }
}

/// JSON objects are rows; a relation is an array field holding either ids
/// or objects with an `id`.
impl Row for serde_json::Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(json_to_value)
    }

    fn related_ids(&self, relation: &str) -> Vec<i64> {
        let Some(items) = self.get(relation).and_then(serde_json::Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| item.as_i64().or_else(|| item.get("id")?.as_i64()))
            .collect()
    }
}

pub(crate) fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN)), Value::Int),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(_) => Value::String(json.to_string()),
    }
}
