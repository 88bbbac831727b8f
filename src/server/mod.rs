//! HTTP API for the browser front-end.
//!
//! One [`AppState`] holds the chat session; [`build_app`] wraps the routes in
//! the body limit, CORS and request tracing layers and [`serve`] binds it.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Largest request body accepted by any endpoint. Utterances and
/// personality directives are short text.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Routes plus the layers every request passes through.
#[must_use]
pub fn build_app(state: Arc<AppState>) -> Router {
    create_router(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `addr` until `shutdown` completes.
///
/// # Errors
/// Returns an error if the address cannot be bound or the listener fails.
pub async fn serve<F>(state: Arc<AppState>, addr: SocketAddr, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "Parley API for model {} on http://{}",
        state.model_name,
        listener.local_addr()?
    );

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
