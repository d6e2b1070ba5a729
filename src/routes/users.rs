use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Users Router Module
///
/// All record operations. The whole router is wrapped by the bearer-token
/// middleware layer in `create_router`; each handler then resolves the
/// caller's role through the `AuthUser` extractor and the service applies
/// the per-operation authorization policy. Authorization outranks existence:
/// a denied caller never learns whether a target username exists.
///
/// Route order note: the literal `/users/domicilio` segment must not be
/// captured by the `{username}` parameter routes; axum resolves static
/// segments before parameters, so both can coexist.
pub fn users_routes() -> Router<AppState> {
    Router::new()
        // POST /users/   (admin) — create
        // GET  /users/   (admin, read) — list every record
        .route(
            "/users/",
            post(handlers::create_user).get(handlers::list_users),
        )
        // GET /users/domicilio  (admin, read, update_address)
        .route("/users/domicilio", get(handlers::list_addresses))
        // PATCH /users/domicilio/{username}  (admin, update_address; address field only)
        .route(
            "/users/domicilio/{username}",
            patch(handlers::patch_address),
        )
        // PUT    /users/{username}  (admin) — full replace, credential rehash included
        // PATCH  /users/{username}  (admin) — field-scoped merge
        // DELETE /users/{username}  (admin)
        .route(
            "/users/{username}",
            axum::routing::put(handlers::replace_user)
                .patch(handlers::patch_user)
                .delete(handlers::delete_user),
        )
}
