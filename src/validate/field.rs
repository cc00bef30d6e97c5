//! Field declaration types
//!
//! Each route declares its inputs as `FieldSpec` values. A field names its
//! source, its kind and an optional constraint descriptor; the shared
//! validation routine reads nothing else.

use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Where a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Location {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared kind of a field value
#[derive(Debug, Clone)]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    /// Repeated query key or JSON array of integers
    IntegerList,
    /// Nested JSON object, body only
    Object(Arc<ModelSchema>),
}

impl FieldKind {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Text => "string",
            Self::IntegerList => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Constraint descriptor attached to a field
///
/// Length bounds apply to text (characters) and lists (items); numeric
/// bounds apply to integers and floats.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub gt: Option<f64>,
    pub ge: Option<f64>,
    pub lt: Option<f64>,
    pub le: Option<f64>,
    pub pattern: Option<Regex>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    #[must_use]
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    #[must_use]
    pub fn gt(mut self, bound: f64) -> Self {
        self.gt = Some(bound);
        self
    }

    #[must_use]
    pub fn ge(mut self, bound: f64) -> Self {
        self.ge = Some(bound);
        self
    }

    #[must_use]
    pub fn lt(mut self, bound: f64) -> Self {
        self.lt = Some(bound);
        self
    }

    #[must_use]
    pub fn le(mut self, bound: f64) -> Self {
        self.le = Some(bound);
        self
    }

    #[must_use]
    pub fn pattern(mut self, regex: Regex) -> Self {
        self.pattern = Some(regex);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.gt.is_none()
            && self.ge.is_none()
            && self.lt.is_none()
            && self.le.is_none()
            && self.pattern.is_none()
    }
}

/// Declaration of one input field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub location: Location,
    pub kind: FieldKind,
    pub required: bool,
    /// Value used when an optional field is absent (null when unset)
    pub default: Option<Value>,
    pub constraints: Constraints,
    pub description: Option<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, location: Location, kind: FieldKind) -> Self {
        Self {
            name,
            location,
            kind,
            required: true,
            default: None,
            constraints: Constraints::default(),
            description: None,
        }
    }

    /// Required path segment
    pub fn path(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, Location::Path, kind)
    }

    /// Required query parameter
    pub fn query(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, Location::Query, kind)
    }

    /// Required body field (model attribute or embedded body parameter)
    pub fn body(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, Location::Body, kind)
    }

    /// Mark the field optional; absent values become null
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Mark the field optional with an explicit default
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn constrained(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Value used when the field is absent from the request
    pub fn absent_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}

/// Named group of body fields (a request model)
#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ModelSchema {
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Arc<Self> {
        Arc::new(Self { name, fields })
    }
}

/// How a route reads its request body
#[derive(Debug, Clone)]
pub enum BodySpec {
    /// The whole body is one model
    Model {
        schema: Arc<ModelSchema>,
        required: bool,
    },
    /// Several body parameters, each under its own key
    Embedded(Vec<FieldSpec>),
}

/// Every declared input of a route
#[derive(Debug, Clone, Default)]
pub struct RouteInputs {
    /// Path and query fields, in declaration order
    pub params: Vec<FieldSpec>,
    pub body: Option<BodySpec>,
}

impl RouteInputs {
    pub fn path_field(&self, name: &str) -> Option<&FieldSpec> {
        self.params
            .iter()
            .find(|f| f.location == Location::Path && f.name == name)
    }
}
