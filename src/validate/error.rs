//! Validation error types
//!
//! A rejected request carries one `FieldError` per violated field. The
//! serialized form is `{"detail": [{"type", "loc", "msg", "input"}]}`.

use serde::Serialize;
use serde_json::Value;

/// One violated field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    /// Location path, e.g. `["body", "item", "price"]` or `["query", "friend_id", 1]`
    pub loc: Vec<Value>,
    pub msg: String,
    pub input: Value,
}

impl FieldError {
    pub fn new(
        error_type: &'static str,
        loc: Vec<Value>,
        msg: impl Into<String>,
        input: Value,
    ) -> Self {
        Self {
            error_type,
            loc,
            msg: msg.into(),
            input,
        }
    }

    pub fn missing(loc: Vec<Value>, input: Value) -> Self {
        Self::new("missing", loc, "Field required", input)
    }

    /// Dotted location for log lines
    pub fn loc_display(&self) -> String {
        self.loc
            .iter()
            .map(|seg| match seg {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Input validation failure: every violated field of one request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} validation error(s): {}", .0.len(), summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reply body for a 422 response
    pub fn to_body(&self) -> Value {
        serde_json::json!({ "detail": self.0 })
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.loc_display(), e.error_type))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated value could not be bound into the handler's type
#[derive(Debug, thiserror::Error)]
#[error("cannot bind {location} field '{field}': {source}")]
pub struct BindError {
    pub location: &'static str,
    pub field: String,
    #[source]
    pub source: serde_json::Error,
}
