//! Route table
//!
//! Built once at startup from an explicit registration list and shared by
//! reference afterwards. Registration checks that every route's pattern and
//! field declarations agree, so dispatch never meets an undeclared input.

use hyper::Method;

use super::matcher::{match_route, Resolution};
use super::pattern::PathPattern;
use super::route::{Route, RouteDef};
use crate::logger;
use crate::validate::{BodySpec, FieldKind, FieldSpec, Location};

/// Malformed route registration
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("route pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("{method} {pattern}: path parameter '{name}' has no declaration")]
    UndeclaredPathParam {
        method: Method,
        pattern: String,
        name: String,
    },
    #[error("{method} {pattern}: path field '{name}' does not appear in the pattern")]
    UnusedPathField {
        method: Method,
        pattern: String,
        name: String,
    },
    #[error("{method} {pattern}: field '{name}' cannot be read from {location} as {kind}")]
    UnsupportedKind {
        method: Method,
        pattern: String,
        name: String,
        location: Location,
        kind: &'static str,
    },
    #[error("{method} {pattern} is already registered")]
    Duplicate { method: Method, pattern: String },
    #[error("invalid field pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Ordered route table
#[derive(Debug, Default)]
pub struct Registry {
    routes: Vec<Route>,
}

fn supported(field: &FieldSpec) -> bool {
    match field.location {
        Location::Path => matches!(
            field.kind,
            FieldKind::Integer | FieldKind::Float | FieldKind::Text
        ),
        Location::Query => !matches!(field.kind, FieldKind::Object(_)),
        Location::Body => false,
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; order of registration is order of matching
    pub fn register(&mut self, def: RouteDef) -> Result<&mut Self, RegistryError> {
        let pattern = PathPattern::parse(def.pattern).map_err(|reason| {
            RegistryError::InvalidPattern {
                pattern: def.pattern.to_string(),
                reason,
            }
        })?;

        for field in &def.inputs.params {
            if !supported(field) {
                return Err(RegistryError::UnsupportedKind {
                    method: def.method,
                    pattern: def.pattern.to_string(),
                    name: field.name.to_string(),
                    location: field.location,
                    kind: field.kind.type_name(),
                });
            }
            if field.location == Location::Path && !pattern.params().any(|p| p == field.name) {
                return Err(RegistryError::UnusedPathField {
                    method: def.method,
                    pattern: def.pattern.to_string(),
                    name: field.name.to_string(),
                });
            }
        }
        if let Some(name) = pattern
            .params()
            .find(|name| def.inputs.path_field(name).is_none())
        {
            return Err(RegistryError::UndeclaredPathParam {
                method: def.method,
                pattern: def.pattern.to_string(),
                name: name.to_string(),
            });
        }
        if let Some(BodySpec::Embedded(fields)) = &def.inputs.body {
            if let Some(field) = fields.iter().find(|f| f.location != Location::Body) {
                return Err(RegistryError::UnsupportedKind {
                    method: def.method,
                    pattern: def.pattern.to_string(),
                    name: field.name.to_string(),
                    location: field.location,
                    kind: field.kind.type_name(),
                });
            }
        }

        for earlier in &self.routes {
            if earlier.method != def.method {
                continue;
            }
            if earlier.pattern == pattern {
                return Err(RegistryError::Duplicate {
                    method: def.method,
                    pattern: def.pattern.to_string(),
                });
            }
            if pattern.is_shadowed_by(&earlier.pattern) {
                logger::log_warning(&format!(
                    "Route {} {} is unreachable: {} was registered first",
                    def.method,
                    def.pattern,
                    earlier.pattern.as_str()
                ));
            }
        }

        self.routes.push(Route {
            method: def.method,
            pattern,
            inputs: def.inputs,
            handler: def.handler,
            meta: def.meta,
        });
        Ok(self)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a request path against the table
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        match_route(&self.routes, method, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HandlerError;
    use crate::validate::{ModelSchema, Validated};
    use serde_json::Value;

    fn noop(_: &Validated) -> Result<Value, HandlerError> {
        Ok(Value::Null)
    }

    #[test]
    fn test_register_keeps_order() {
        let mut registry = Registry::new();
        registry
            .register(RouteDef::get("/", noop))
            .unwrap()
            .register(RouteDef::post("/", noop))
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.routes()[1].method, Method::POST);
    }

    #[test]
    fn test_rejects_undeclared_path_param() {
        let mut registry = Registry::new();
        let err = registry
            .register(RouteDef::get("/items/{item_id}", noop))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UndeclaredPathParam { .. }));
        assert!(err.to_string().contains("item_id"));
    }

    #[test]
    fn test_rejects_unused_path_field() {
        let mut registry = Registry::new();
        let err = registry
            .register(
                RouteDef::get("/items", noop).param(FieldSpec::path("item_id", FieldKind::Integer)),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnusedPathField { .. }));
    }

    #[test]
    fn test_rejects_unsupported_kinds() {
        let schema = ModelSchema::new("Item", Vec::new());
        let mut registry = Registry::new();
        let err = registry
            .register(
                RouteDef::get("/items", noop)
                    .param(FieldSpec::query("item", FieldKind::Object(schema))),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedKind { .. }));

        let err = registry
            .register(
                RouteDef::get("/items/{ids}", noop)
                    .param(FieldSpec::path("ids", FieldKind::IntegerList)),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedKind { .. }));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_patterns() {
        let mut registry = Registry::new();
        registry.register(RouteDef::get("/user", noop)).unwrap();
        let err = registry.register(RouteDef::get("/user", noop)).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));

        // Same pattern under another method is a distinct route
        registry.register(RouteDef::post("/user", noop)).unwrap();

        let err = registry.register(RouteDef::get("user", noop)).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPattern { .. }));
    }
}
