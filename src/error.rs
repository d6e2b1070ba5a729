use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// FieldError
///
/// One failed field validation. Validation responses enumerate every failing
/// field, not only the first, so clients do not have to guess-and-retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// StoreError
///
/// Failure inside the persistence layer: the collection file could not be
/// read, parsed, or atomically rewritten.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contains invalid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// ApiError
///
/// The complete request-level error taxonomy. Precedence on a single request:
/// token errors (401) are produced by the `AuthUser` extractor before any
/// handler runs; the service checks authorization (403) before touching the
/// store, so a caller without permission never learns whether a target
/// username exists or whether their payload would validate.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One indistinguishable error for "no such user" and "wrong password";
    /// splitting them would enable username enumeration.
    #[error("incorrect username or password")]
    InvalidCredentials,
    #[error("token signature could not be verified")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("you do not have permission to perform this action")]
    Forbidden,
    #[error("user not found")]
    NotFound,
    #[error("user already exists")]
    AlreadyExists,
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("credential hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// ErrorBody
///
/// The JSON shape of every error response. `fields` is present only for
/// validation failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials
            | ApiError::InvalidSignature
            | ApiError::Expired
            | ApiError::Malformed => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Hashing(_) | ApiError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail goes to the log, not the client.
        match &self {
            ApiError::Storage(e) => tracing::error!("storage failure: {e}"),
            ApiError::Hashing(e) => tracing::error!("hashing failure: {e}"),
            ApiError::Signing(e) => tracing::error!("token signing failure: {e}"),
            _ => {}
        }

        let body = match &self {
            ApiError::Validation(fields) => ErrorBody {
                error: self.to_string(),
                fields: Some(fields.clone()),
            },
            ApiError::Storage(_) | ApiError::Hashing(_) | ApiError::Signing(_) => ErrorBody {
                error: "internal server error".to_string(),
                fields: None,
            },
            _ => ErrorBody {
                error: self.to_string(),
                fields: None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
