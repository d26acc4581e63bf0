//! Query response payload

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, WriterError};

/// Named response values in insertion order, as computed by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResponse {
    values: Map<String, Value>,
}

impl QueryResponse {
    /// Create an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value; a repeated name replaces the earlier value
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Look up a top-level value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// All values
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Whether the response holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(WriterError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Parse from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| WriterError::InvalidResponse(e.to_string()))?;
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for QueryResponse {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insertion_order() {
        let mut rsp = QueryResponse::new();
        rsp.add("responseHeader", json!({"status": 0}))
            .add("response", json!({"numFound": 0, "docs": []}))
            .add("debug", "off");

        let keys: Vec<_> = rsp.values().keys().cloned().collect();
        assert_eq!(keys, vec!["responseHeader", "response", "debug"]);
        assert_eq!(rsp.get("debug"), Some(&json!("off")));
    }

    #[test]
    fn test_from_json() {
        let rsp = QueryResponse::from_json(r#"{"response_data": "testing"}"#).unwrap();
        assert_eq!(rsp.get("response_data"), Some(&json!("testing")));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = QueryResponse::from_json("[1, 2]").unwrap_err();
        assert!(matches!(&err, WriterError::InvalidResponse(m) if m.contains("an array")));
        assert!(!err.to_string().contains("Configuration"));

        let err = QueryResponse::from_json("{not json").unwrap_err();
        assert!(matches!(err, WriterError::InvalidResponse(_)));
    }
}
