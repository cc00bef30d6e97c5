//! Route definition types

use hyper::Method;
use serde_json::Value;

use super::pattern::PathPattern;
use crate::validate::{BindError, BodySpec, FieldSpec, RouteInputs, Validated};

/// Handler failure after validation passed
///
/// Both variants mean the route's declarations and its handler disagree;
/// they surface as 500 replies.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("cannot serialize reply: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handler entry: validated inputs in, JSON reply out
pub type HandlerFn = fn(&Validated) -> Result<Value, HandlerError>;

/// Presentation metadata, used only by the interface description
#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub operation_id: &'static str,
    pub summary: &'static str,
    pub description: Option<&'static str>,
    pub tags: Vec<&'static str>,
    pub include_in_schema: bool,
}

/// A route as written in the registration list, before validation
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub(super) method: Method,
    pub(super) pattern: &'static str,
    pub(super) inputs: RouteInputs,
    pub(super) handler: HandlerFn,
    pub(super) meta: RouteMeta,
}

impl RouteDef {
    pub fn new(method: Method, pattern: &'static str, handler: HandlerFn) -> Self {
        Self {
            method,
            pattern,
            inputs: RouteInputs::default(),
            handler,
            meta: RouteMeta {
                operation_id: pattern,
                summary: "",
                description: None,
                tags: Vec::new(),
                include_in_schema: true,
            },
        }
    }

    pub fn get(pattern: &'static str, handler: HandlerFn) -> Self {
        Self::new(Method::GET, pattern, handler)
    }

    pub fn post(pattern: &'static str, handler: HandlerFn) -> Self {
        Self::new(Method::POST, pattern, handler)
    }

    pub fn put(pattern: &'static str, handler: HandlerFn) -> Self {
        Self::new(Method::PUT, pattern, handler)
    }

    #[must_use]
    pub fn operation(mut self, operation_id: &'static str, summary: &'static str) -> Self {
        self.meta.operation_id = operation_id;
        self.meta.summary = summary;
        self
    }

    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.meta.description = Some(description);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.meta.tags.push(tag);
        self
    }

    /// Declare a path or query parameter
    #[must_use]
    pub fn param(mut self, field: FieldSpec) -> Self {
        self.inputs.params.push(field);
        self
    }

    #[must_use]
    pub fn body(mut self, body: BodySpec) -> Self {
        self.inputs.body = Some(body);
        self
    }

    /// Keep the route reachable but out of the interface description
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.meta.include_in_schema = false;
        self
    }
}

/// A registered route
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub inputs: RouteInputs,
    pub handler: HandlerFn,
    pub meta: RouteMeta,
}

impl Route {
    /// Run the handler on validated inputs
    pub fn call(&self, validated: &Validated) -> Result<Value, HandlerError> {
        (self.handler)(validated)
    }
}
