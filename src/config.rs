use std::env;
use std::path::PathBuf;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded,
/// ensuring consistency across all threads and services, and shared through
/// the unified application state via FromRef.
///
/// The signing secret lives here and only here: the token service borrows it
/// at startup and nothing else ever reads it. It is loaded once per process
/// and never rotated at runtime; rotating it invalidates every outstanding
/// token.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format selection.
    pub env: Env,
    // Symmetric secret used to sign and verify bearer tokens (HS256).
    pub jwt_secret: String,
    // Path of the persisted JSON record collection.
    pub users_path: PathBuf,
    // Lifetime of issued tokens, in minutes.
    pub token_ttl_minutes: i64,
    // Listen address for the HTTP server.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context, used to switch between human-readable local
/// logging and JSON production logging, and to decide whether a missing
/// JWT secret is fatal.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

// Reference policy: tokens live for three hours.
const DEFAULT_TTL_MINUTES: i64 = 60 * 3;

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring any environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            users_path: PathBuf::from("users.json"),
            token_ttl_minutes: DEFAULT_TTL_MINUTES,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration
    /// at startup. It reads all parameters from environment variables and
    /// implements the fail-fast principle.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is not set while running in production. The
    /// process must not start with a guessable signing secret.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            // In local, a fallback keeps the developer loop short.
            _ => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        let users_path =
            PathBuf::from(env::var("USERS_FILE").unwrap_or_else(|_| "users.json".to_string()));

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TTL_MINUTES);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            env,
            jwt_secret,
            users_path,
            token_ttl_minutes,
            bind_addr,
        }
    }
}
