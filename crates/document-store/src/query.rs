use serde_json::{Map, Value};

/// Filter over the documents of one collection.
///
/// `filter` uses JSON containment: a document matches when its body
/// contains every key/value pair of the filter (nested objects are matched
/// recursively, arrays match when every filter element is contained in some
/// element of the document array).
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    /// Collection to search.
    pub collection: String,

    /// Containment filter applied to the document body.
    pub filter: Map<String, Value>,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query matching every document of `collection`.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: Map::new(),
            limit: None,
            offset: None,
        }
    }

    /// Requires the top-level `field` of the body to equal `value`.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns the filter as a JSON object.
    pub fn filter_value(&self) -> Value {
        Value::Object(self.filter.clone())
    }

    /// Returns true if `body` satisfies the containment filter.
    pub fn matches(&self, body: &Value) -> bool {
        self.filter
            .iter()
            .all(|(key, expected)| body.get(key).is_some_and(|actual| contains(actual, expected)))
    }
}

/// Mirrors PostgreSQL's `jsonb @> jsonb` semantics.
fn contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected
            .iter()
            .all(|(k, v)| actual.get(k).is_some_and(|a| contains(a, v))),
        (Value::Array(actual), Value::Array(expected)) => expected
            .iter()
            .all(|e| actual.iter().any(|a| contains(a, e))),
        (Value::Array(actual), scalar) if !scalar.is_object() => {
            actual.iter().any(|a| a == scalar)
        }
        _ => actual == expected,
    }
}
