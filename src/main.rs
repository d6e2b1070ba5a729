use std::sync::Arc;

use padron_portal::{
    AppState, TokenService, UserService,
    config::{AppConfig, Env},
    create_router,
    repository::{JsonFileRepository, RepositoryState},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point, responsible for initializing all core
/// components: configuration, logging, the record store, the token service,
/// and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (fail-fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // AppConfig::load() panics on a missing production JWT secret.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "padron_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: pretty print for human readability while debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Record Store Initialization
    // Opens (or creates) the persisted JSON collection. A corrupt or
    // unreadable store is a startup failure, not something to limp past.
    let repo = Arc::new(
        JsonFileRepository::open(&config.users_path)
            .expect("FATAL: failed to open the user record store. Check USERS_FILE."),
    ) as RepositoryState;

    // 5. Token Service Initialization
    // The signing secret leaves AppConfig exactly once, here.
    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        config.token_ttl_minutes,
    ));

    // 6. Unified State Assembly
    let app_state = AppState {
        service: UserService::new(repo, tokens),
        config: config.clone(),
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: failed to bind listen address. Check BIND_ADDR.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
