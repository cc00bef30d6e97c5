// Accept loop
// Runs until shutdown is signalled, then drains in-flight connections

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(20);

/// Accept connections until `shutdown` is notified.
///
/// The listener is closed as soon as shutdown starts. Connections already
/// accepted keep running on their own tasks; this waits for them for at most
/// the connection timeout.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => match accept_result {
                Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(state.active_connections.load(Ordering::SeqCst));

    let remaining = drain_connections(&state, state.config.connection_timeout()).await;
    logger::log_shutdown_complete(remaining);
}

/// Wait until no connection is active or `grace` elapses, returning the
/// number still open.
async fn drain_connections(state: &AppState, grace: Duration) -> usize {
    let deadline = Instant::now() + grace;
    loop {
        let active = state.active_connections.load(Ordering::SeqCst);
        if active == 0 || Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
