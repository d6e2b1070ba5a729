use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, models::Role, repository::RepositoryState};

/// Claims
///
/// The payload structure signed into every bearer token. Possession of a
/// token with a verifiable signature and an unexpired `exp` is the whole of
/// the authentication state; nothing is kept server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the username of the authenticated principal.
    pub sub: String,
    /// Expiration Time (exp): unix timestamp after which the token must not
    /// be accepted.
    pub exp: usize,
    /// Issued At (iat): unix timestamp when the token was issued.
    pub iat: usize,
}

/// TokenService
///
/// Issues and verifies signed, time-bounded bearer tokens (HS256). The
/// symmetric secret is taken from AppConfig at startup and held only here;
/// no other component may mint tokens. Tokens are bearer-only and there is
/// no revocation list: compromise requires rotating the secret, which
/// invalidates every outstanding token.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

/// The shared handle stored in the application state.
pub type TokenState = Arc<TokenService>;

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// issue
    ///
    /// Builds and signs `{sub, iat, exp: now + ttl}` for the given subject.
    pub fn issue(&self, subject: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Signing(e.to_string()))
    }

    /// verify
    ///
    /// Checks signature integrity and expiry against the current clock and
    /// returns the subject. An unverifiable signature (wrong secret and
    /// tampered payload are indistinguishable by design) maps to
    /// `InvalidSignature`; a stale `exp` maps to `Expired`; anything that
    /// cannot be decoded at all maps to `Malformed`.
    pub fn verify(&self, token: &str) -> Result<String, ApiError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(ApiError::Expired),
                ErrorKind::InvalidSignature => Err(ApiError::InvalidSignature),
                _ => Err(ApiError::Malformed),
            },
        }
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the token subject plus
/// the role currently stored for it. Handlers take this as an argument; the
/// extractor below is the only path that produces it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any protected handler, cleanly separating
/// authentication from the business logic behind it.
///
/// The process:
/// 1. Dependency Resolution: TokenService and Repository from the app state.
/// 2. Token Extraction: standard Bearer header handling.
/// 3. Verification: signature and expiry via TokenService.
/// 4. Store Lookup: the subject's current role. A token whose subject was
///    deleted after issuance is rejected even though its signature verifies.
///
/// Rejection is an `ApiError`, so 401 bodies follow the normal error shape
/// and carry the `WWW-Authenticate: Bearer` header.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let tokens = TokenState::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Malformed)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Malformed)?;

        let subject = tokens.verify(token)?;

        // The token is valid, but the subject must still exist in the store.
        let user = repo
            .find(&subject)
            .await
            .ok_or(ApiError::InvalidCredentials)?;

        Ok(AuthUser {
            username: user.username,
            role: user.role,
        })
    }
}
