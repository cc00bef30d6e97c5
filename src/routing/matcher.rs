//! Route matching module
//!
//! First match by registration order: the earliest route whose pattern and
//! method both match wins. A path that matches only under other methods is
//! reported as method-not-allowed.

use hyper::Method;

use super::pattern::split_path;
use super::route::Route;

/// Outcome of resolving a request against the route table
#[derive(Debug)]
pub enum Resolution<'a> {
    Matched {
        route: &'a Route,
        params: Vec<(String, String)>,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

/// Find the first route matching method and path
pub fn match_route<'a>(routes: &'a [Route], method: &Method, path: &str) -> Resolution<'a> {
    let segments = split_path(path);
    let mut allowed: Vec<Method> = Vec::new();

    for route in routes {
        let Some(params) = route.pattern.capture(&segments) else {
            continue;
        };
        if route.method == *method {
            return Resolution::Matched { route, params };
        }
        if !allowed.contains(&route.method) {
            allowed.push(route.method.clone());
        }
    }

    if allowed.is_empty() {
        Resolution::NotFound
    } else {
        Resolution::MethodNotAllowed { allowed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{HandlerError, Registry, RouteDef};
    use crate::validate::{FieldKind, FieldSpec, Validated};
    use serde_json::{json, Value};

    fn fixed(_: &Validated) -> Result<Value, HandlerError> {
        Ok(json!("fixed"))
    }

    fn dynamic(_: &Validated) -> Result<Value, HandlerError> {
        Ok(json!("dynamic"))
    }

    fn registry(static_first: bool) -> Registry {
        let fixed_route = RouteDef::get("/user/me", fixed);
        let dynamic_route = RouteDef::get("/user/{user_id}", dynamic)
            .param(FieldSpec::path("user_id", FieldKind::Text));
        let mut registry = Registry::new();
        let (first, second) = if static_first {
            (fixed_route, dynamic_route)
        } else {
            (dynamic_route, fixed_route)
        };
        registry.register(first).unwrap();
        registry.register(second).unwrap();
        registry
    }

    fn matched_pattern(resolution: &Resolution<'_>) -> Option<String> {
        match resolution {
            Resolution::Matched { route, .. } => Some(route.pattern.as_str().to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_static_before_dynamic_both_reachable() {
        let registry = registry(true);
        let me = registry.resolve(&Method::GET, "/user/me");
        assert_eq!(matched_pattern(&me).as_deref(), Some("/user/me"));

        let other = registry.resolve(&Method::GET, "/user/42");
        assert_eq!(matched_pattern(&other).as_deref(), Some("/user/{user_id}"));
        if let Resolution::Matched { params, .. } = other {
            assert_eq!(params, vec![("user_id".to_string(), "42".to_string())]);
        }
    }

    #[test]
    fn test_dynamic_first_swallows_static() {
        let registry = registry(false);
        let me = registry.resolve(&Method::GET, "/user/me");
        assert_eq!(matched_pattern(&me).as_deref(), Some("/user/{user_id}"));
    }

    #[test]
    fn test_method_not_allowed_and_not_found() {
        let registry = registry(true);
        match registry.resolve(&Method::DELETE, "/user/me") {
            Resolution::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Method::GET]),
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert!(matches!(
            registry.resolve(&Method::GET, "/nowhere"),
            Resolution::NotFound
        ));
    }
}
