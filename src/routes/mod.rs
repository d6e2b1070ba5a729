/// Router Module Index
///
/// Organizes the routing logic into security-segregated modules, so access
/// control is applied explicitly at the module level (via Axum layers)
/// rather than remembered handler by handler.

/// Routes open to unauthenticated clients: liveness and the token endpoint.
pub mod public;

/// Routes protected by the bearer-token layer; per-operation role checks
/// happen in the service behind each handler.
pub mod users;
