// Application state module
// Shared, read-only after startup except for the connection counter

use hyper::body::Bytes;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::docs;
use crate::routing::Registry;

/// Application state
pub struct AppState {
    pub config: Config,
    pub registry: Arc<Registry>,
    /// Interface description rendered once at startup (None when disabled)
    pub openapi_json: Option<Bytes>,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Build state from loaded configuration and the route table
    pub fn new(config: Config, registry: Registry) -> Result<Self, serde_json::Error> {
        let openapi_json = if config.docs.enabled {
            let document = docs::generate(&registry, &config.docs);
            Some(Bytes::from(serde_json::to_vec(&document)?))
        } else {
            None
        };

        Ok(Self {
            config,
            registry: Arc::new(registry),
            openapi_json,
            active_connections: AtomicUsize::new(0),
        })
    }
}
