use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// The unauthenticated surface: the health probe and the two identity
/// gateway endpoints. Everything else demands a bearer token and lives in
/// the authenticated router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // Liveness probe for load balancers; no database round-trip.
        .route("/health", get(|| async { "ok" }))
        // Form-encoded credential exchange.
        .route("/auth/login", post(handlers::auth::login))
        // Open self-registration; always lands in the viewer tier.
        .route("/auth/register", post(handlers::auth::register))
}
