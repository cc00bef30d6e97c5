//! Request routing entry module
//!
//! Entry point for HTTP request processing: method and size checks, body
//! collection, the interface description route, then dispatch.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::dispatch::{dispatch, RequestParts};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let config = &state.config;
    let entry = config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(remote_addr, &req));

    logger::log_headers_count(req.headers().len(), config.logging.show_headers);

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&config.http.server_name) {
        response.headers_mut().insert("Server", server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let config = &state.config;

    // 1. Preflight
    if req.method() == Method::OPTIONS {
        return http::build_options_response(config.http.enable_cors);
    }

    // 2. Declared body size
    if let Some(resp) = check_body_size(&req, config.http.max_body_size) {
        return resp;
    }

    // 3. Interface description
    if req.method() == Method::GET && req.uri().path() == config.docs.openapi_path {
        if let Some(doc) = &state.openapi_json {
            return http::build_json_bytes_response(StatusCode::OK, doc.clone());
        }
    }

    // 4. Collect the body, enforcing the limit on undeclared lengths too
    let (parts, body) = req.into_parts();
    let limit = usize::try_from(config.http.max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_error(&format!(
                "Request body too large (max: {})",
                config.http.max_body_size
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_400_response();
        }
    };

    // 5. Dispatch
    dispatch(
        &state.registry,
        &RequestParts {
            method: &parts.method,
            path: parts.uri.path(),
            query: parts.uri.query(),
            body: &body,
        },
    )
    .into_response()
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::config::Config;
    use serde_json::{json, Value};

    fn state(config: Config) -> Arc<AppState> {
        Arc::new(AppState::new(config, api::catalogue().unwrap()).unwrap())
    }

    fn quiet() -> Config {
        let mut config = Config::default();
        config.logging.access_log = false;
        config
    }

    async fn send(
        state: &Arc<AppState>,
        req: Request<Full<Bytes>>,
    ) -> (StatusCode, Response<Full<Bytes>>) {
        let resp = handle_request(req, Arc::clone(state), None).await.unwrap();
        (resp.status(), resp)
    }

    async fn json_body(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_item_through_adapter() {
        let state = state(quiet());
        let (status, resp) = send(
            &state,
            request(Method::POST, "/items", r#"{"name": "pen", "price": 10, "tax": null}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp.headers()["Server"].to_str().unwrap().starts_with("demo_endpoints/"));
        assert_eq!(json_body(resp).await["item"]["total_price"], json!(20.0));
    }

    #[tokio::test]
    async fn test_validation_failure_is_422() {
        let state = state(quiet());
        let (status, resp) = send(
            &state,
            request(Method::POST, "/items/5?item_type=x", r#"{"importance": 1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(resp).await;
        assert_eq!(body["detail"][0]["type"], "missing");
        assert_eq!(body["detail"][0]["loc"], json!(["body", "item"]));
        assert!(body.get("item_id").is_none());
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let mut config = quiet();
        config.http.max_body_size = 16;
        let state = state(config);

        let mut req = request(Method::POST, "/user", &"x".repeat(64));
        req.headers_mut().insert("content-length", HeaderValue::from(64_u64));
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        // No declared length: the collected body is still capped
        let (status, _) = send(&state, request(Method::POST, "/user", &"x".repeat(64))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_options_and_method_not_allowed() {
        let state = state(quiet());
        let (status, _) = send(&state, request(Method::OPTIONS, "/items", "")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, resp) = send(&state, request(Method::DELETE, "/", "")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "GET, POST, PUT");
        assert_eq!(json_body(resp).await, json!({"detail": "Method Not Allowed"}));
    }

    #[tokio::test]
    async fn test_openapi_served_when_enabled() {
        let state_on = state(quiet());
        let (status, resp) = send(&state_on, request(Method::GET, "/openapi.json", "")).await;
        assert_eq!(status, StatusCode::OK);
        let doc = json_body(resp).await;
        assert!(doc["paths"]["/friends"].is_object());
        assert!(doc["paths"].get("/friends/hidden").is_none());

        let mut config = quiet();
        config.docs.enabled = false;
        let state_off = state(config);
        let (status, _) = send(&state_off, request(Method::GET, "/openapi.json", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hidden_route_still_served() {
        let state = state(quiet());
        let (status, resp) = send(
            &state,
            request(Method::GET, "/friends/hidden?friend_id=3&friend_id=4", ""),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({"friend_id": [3, 4]}));
    }
}
