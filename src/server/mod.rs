//! Server module
//!
//! Listener setup, connection serving, the accept loop and shutdown
//! signalling.

pub mod connection;
pub mod listener;
mod serve;
pub mod signal;

pub use listener::create_reusable_listener;
pub use serve::start_server_loop;
pub use signal::start_signal_handler;

use std::sync::Arc;
use tokio::sync::Notify;

use crate::api;
use crate::config::{AppState, Config};
use crate::logger;
use crate::routing::RegistryError;

/// Errors that stop the server from starting
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Address(String),
    #[error("route table error: {0}")]
    Registry(#[from] RegistryError),
    #[error("cannot render interface description: {0}")]
    Docs(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the route table and state, bind, and serve until SIGTERM/SIGINT.
///
/// Must be called from within a tokio runtime.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let addr = config.get_socket_addr().map_err(ServerError::Address)?;
    let registry = api::catalogue()?;
    let routes = registry.len();
    let state = Arc::new(AppState::new(config, registry)?);

    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &state.config, routes);

    let shutdown = Arc::new(Notify::new());
    start_signal_handler(Arc::clone(&shutdown));
    start_server_loop(listener, state, shutdown).await;
    Ok(())
}
