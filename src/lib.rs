use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod service;
pub mod validate;

// Module for routing segregation (Public, Users).
pub mod routes;
use auth::AuthUser; // The resolved authenticated caller identity.
use routes::{public, users};

// --- Public Re-exports ---

// Makes core state types easily accessible to the entry point (main.rs).
pub use auth::{TokenService, TokenState};
pub use config::AppConfig;
pub use repository::{JsonFileRepository, RepositoryState};
pub use service::UserService;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application from every
/// handler decorated with `#[utoipa::path]` and every schema deriving
/// `ToSchema`. The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::create_user,
        handlers::list_users,
        handlers::list_addresses,
        handlers::replace_user,
        handlers::patch_user,
        handlers::patch_address,
        handlers::delete_user,
    ),
    components(
        schemas(
            models::Role,
            models::UserView,
            models::AddressView,
            models::CreateUserRequest,
            models::UpdateUserRequest,
            models::LoginForm,
            models::TokenResponse,
            models::DeleteResponse,
            error::ErrorBody,
            error::FieldError,
        )
    ),
    tags(
        (name = "padron-portal", description = "Personal-record credential service API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Service layer: authentication, authorization and the record lifecycle.
    pub service: UserService,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow extractors to selectively pull components out of the shared
// AppState without seeing the rest of it.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.service.repo.clone()
    }
}

impl FromRef<AppState> for TokenState {
    fn from_ref(app_state: &AppState) -> TokenState {
        app_state.service.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces bearer authentication for the users router. It attempts to
/// extract `AuthUser`; a failed extraction (missing header, bad signature,
/// expired token, deleted subject) rejects the request with the extractor's
/// 401 before any handler runs. Handlers still take their own `AuthUser`
/// argument — this layer is the outer fence, not the authoritative check.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Record routes: protected by the bearer-token layer.
        .merge(
            users::users_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique id for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in
                // a span that carries the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: the
/// `x-request-id` header (if present) is included in the structured logging
/// metadata alongside the HTTP method and URI, so every log line for a
/// single request is correlated by one id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
