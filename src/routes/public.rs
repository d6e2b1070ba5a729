use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines the endpoints reachable without a bearer token. This surface is
/// deliberately tiny: a liveness probe and the credential exchange. Every
/// record operation lives behind the protected router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /token
        // Exchanges form credentials for a signed bearer token. The handler
        // returns one indistinguishable 401 for unknown users and wrong
        // passwords.
        .route("/token", post(handlers::login))
}
