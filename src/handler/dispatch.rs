//! Request dispatch module
//!
//! Resolve, validate, invoke. Pure over its inputs: no I/O besides logging,
//! so the whole handler set can be exercised without a socket.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use serde_json::Value;

use crate::http;
use crate::logger;
use crate::routing::{HandlerError, Registry, Resolution};
use crate::validate::{self, QueryParams, RawInputs, ValidationErrors};

/// The parts of a request dispatch reads
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    pub body: &'a [u8],
}

/// Outcome of dispatching one request
#[derive(Debug)]
pub enum Reply {
    Json(Value),
    NotFound,
    MethodNotAllowed(Vec<Method>),
    Invalid(ValidationErrors),
    Failed(HandlerError),
}

impl Reply {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Json(_) => StatusCode::OK,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::Json(value) => http::build_json_response(StatusCode::OK, &value),
            Self::NotFound => http::build_404_response(),
            Self::MethodNotAllowed(allowed) => http::build_405_response(&allowed),
            Self::Invalid(errors) => http::build_422_response(&errors),
            Self::Failed(_) => http::build_500_response(),
        }
    }
}

/// Dispatch one request against the route table
pub fn dispatch(registry: &Registry, parts: &RequestParts<'_>) -> Reply {
    let (route, params) = match registry.resolve(parts.method, parts.path) {
        Resolution::Matched { route, params } => (route, params),
        Resolution::MethodNotAllowed { allowed } => return Reply::MethodNotAllowed(allowed),
        Resolution::NotFound => return Reply::NotFound,
    };

    let query = QueryParams::parse(parts.query);
    let raw = RawInputs {
        path: &params,
        query: &query,
        body: parts.body,
    };
    let validated = match validate::validate(&route.inputs, &raw) {
        Ok(v) => v,
        Err(errors) => {
            logger::log_debug(&format!(
                "{} {}: {errors}",
                parts.method,
                route.pattern.as_str()
            ));
            return Reply::Invalid(errors);
        }
    };

    match route.call(&validated) {
        Ok(value) => Reply::Json(value),
        Err(e) => {
            logger::log_error(&format!(
                "Handler for {} {} failed: {e}",
                route.method,
                route.pattern.as_str()
            ));
            Reply::Failed(e)
        }
    }
}
