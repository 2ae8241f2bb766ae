//! HTTP server wiring for paast (shared state, routes, and serve loop).

/// HTTP error mapping for handlers.
pub mod error;
/// HTTP handlers for the usage page and paste endpoints.
pub mod handlers;

pub use paast_core::{
    config, AppError, Config, PasteStore, SubmissionThrottle, DEFAULT_PORT,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PasteStore>,
    pub throttle: Arc<SubmissionThrottle>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `store`: Open paste store.
    ///
    /// # Returns
    /// A new [`AppState`] with a fresh throttle using the configured cooldown.
    pub fn new(config: Config, store: PasteStore) -> Self {
        let throttle = SubmissionThrottle::new(config.paste_cooldown());
        Self {
            store: Arc::new(store),
            throttle: Arc::new(throttle),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// Handlers that create pastes need the peer address, so serve the router
/// through [`serve_router`] (or add `MockConnectInfo` in tests).
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::manpage::manpage).post(handlers::paste::create_paste),
        )
        .route("/:id", get(handlers::paste::get_paste))
        .with_state(state.clone())
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(state.config.max_paste_size))
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
}

/// Resolve the listener address from the `BIND` override or the configured port.
///
/// # Returns
/// `BIND` when it parses as a socket address, otherwise `0.0.0.0:<port>`.
pub fn resolve_bind_address(config: &Config) -> SocketAddr {
    let default_bind = SocketAddr::from(([0, 0, 0, 0], config.port));
    match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    }
}

/// Run the server with peer-address info and graceful shutdown.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
}
