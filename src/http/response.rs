//! HTTP response building module
//!
//! Builders for every reply the service sends. All bodies are JSON.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use serde_json::{json, Value};

use crate::validate::ValidationErrors;

const JSON: &str = "application/json";

/// Methods listed in OPTIONS replies
const OPTIONS_ALLOW: &str = "GET, POST, PUT, OPTIONS";

/// Build a JSON response from already encoded bytes
pub fn build_json_bytes_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", JSON)
        .header("Content-Length", body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a JSON response from a value
pub fn build_json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    // Serializing a `Value` cannot fail
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    build_json_bytes_response(status, Bytes::from(bytes))
}

fn build_detail_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    build_json_response(status, &json!({ "detail": detail }))
}

/// Build 400 Bad Request response (unreadable body)
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_detail_response(StatusCode::BAD_REQUEST, "Bad Request")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_detail_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response listing the methods the path accepts
pub fn build_405_response(allowed: &[Method]) -> Response<Full<Bytes>> {
    let mut resp = build_detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match allow.parse() {
        Ok(value) => {
            resp.headers_mut().insert("Allow", value);
        }
        Err(e) => crate::logger::log_error(&format!("Invalid Allow header '{allow}': {e}")),
    }
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_detail_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build 422 response carrying every validation failure
pub fn build_422_response(errors: &ValidationErrors) -> Response<Full<Bytes>> {
    build_json_response(StatusCode::UNPROCESSABLE_ENTITY, &errors.to_body())
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", OPTIONS_ALLOW);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", OPTIONS_ALLOW)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_404_body() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Content-Type"], JSON);
        assert_eq!(body_json(resp).await, json!({"detail": "Not Found"}));
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response(&[Method::GET, Method::POST]);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "GET, POST");
    }

    #[test]
    fn test_options_cors() {
        let plain = build_options_response(false);
        assert_eq!(plain.status(), StatusCode::NO_CONTENT);
        assert!(plain.headers().get("Access-Control-Allow-Origin").is_none());

        let cors = build_options_response(true);
        assert_eq!(cors.headers()["Access-Control-Allow-Origin"], "*");
    }
}
