use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that answer without a session. `/navigate` accepts an optional session and
/// tells anonymous callers to render the login view.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Exchanges credentials for a session token.
        .route("/login", post(handlers::login))
        // GET /navigate?path=...
        // Route guard: render page, render login, access denied or not found.
        .route("/navigate", get(handlers::navigate))
}
