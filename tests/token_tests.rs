use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use padron_portal::{
    AppState, TokenService, UserService,
    auth::{AuthUser, Claims},
    config::AppConfig,
    error::{ApiError, StoreError},
    models::{Role, UserRecord},
    repository::{RecordPatch, Repository},
};
use std::{sync::Arc, time::SystemTime};

// --- Mock Repository for Extractor Logic ---

#[derive(Default)]
struct MockRepo {
    user_to_return: Option<UserRecord>,
}

#[async_trait]
impl Repository for MockRepo {
    async fn list(&self) -> Vec<UserRecord> {
        self.user_to_return.iter().cloned().collect()
    }
    async fn find(&self, username: &str) -> Option<UserRecord> {
        self.user_to_return
            .clone()
            .filter(|u| u.username == username)
    }
    async fn insert(&self, _record: UserRecord) -> Result<bool, StoreError> {
        Ok(true)
    }
    async fn replace(
        &self,
        _username: &str,
        _record: UserRecord,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }
    async fn merge(
        &self,
        _username: &str,
        _patch: RecordPatch,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }
    async fn remove(&self, _username: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn sample_record(username: &str, role: Role) -> UserRecord {
    UserRecord {
        username: username.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        role,
        curp: "GOMC950712HDFRRL08".to_string(),
        cp: "01234".to_string(),
        rfc: "GOMC950712AB1".to_string(),
        phone: "5512345678".to_string(),
        birthdate: "12-07-1995".to_string(),
        address: "Calle Falsa 123".to_string(),
    }
}

/// Signs a raw token with an arbitrary expiry offset (and optionally a
/// different secret), bypassing TokenService so expiry and tampering can be
/// exercised directly.
fn create_token(subject: &str, exp_offset: i64, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: subject.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(repo: MockRepo) -> AppState {
    let tokens = Arc::new(TokenService::new(TEST_JWT_SECRET, 180));
    AppState {
        service: UserService::new(Arc::new(repo), tokens),
        config: AppConfig::default(),
    }
}

/// Helper to get the mutable Parts struct from a generated Request.
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- TokenService Tests ---

#[test]
fn issue_then_verify_returns_same_subject() {
    let tokens = TokenService::new(TEST_JWT_SECRET, 180);
    let token = tokens.issue("ana").unwrap();
    let subject = tokens.verify(&token).unwrap();
    assert_eq!(subject, "ana");
}

#[test]
fn expired_token_fails_with_expired_even_with_valid_signature() {
    let tokens = TokenService::new(TEST_JWT_SECRET, 180);
    // Well past the default validation leeway.
    let token = create_token("ana", -3600, TEST_JWT_SECRET);
    let err = tokens.verify(&token).unwrap_err();
    assert!(matches!(err, ApiError::Expired), "got {err:?}");
}

#[test]
fn token_signed_with_other_secret_fails_with_invalid_signature() {
    let tokens = TokenService::new(TEST_JWT_SECRET, 180);
    let token = create_token("ana", 3600, "a-completely-different-secret");
    let err = tokens.verify(&token).unwrap_err();
    assert!(matches!(err, ApiError::InvalidSignature), "got {err:?}");
}

#[test]
fn tampered_payload_fails_verification() {
    let tokens = TokenService::new(TEST_JWT_SECRET, 180);
    let token = tokens.issue("ana").unwrap();
    // Swap the payload segment for the one of a token naming another
    // subject; the signature no longer matches.
    let other = tokens.issue("eve").unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
    let err = tokens.verify(&forged).unwrap_err();
    assert!(matches!(err, ApiError::InvalidSignature), "got {err:?}");
}

#[test]
fn garbage_token_fails_with_malformed() {
    let tokens = TokenService::new(TEST_JWT_SECRET, 180);
    let err = tokens.verify("not-a-token-at-all").unwrap_err();
    assert!(matches!(err, ApiError::Malformed), "got {err:?}");
}

// --- AuthUser Extractor Tests ---

#[tokio::test]
async fn extractor_resolves_subject_and_current_role() {
    let repo = MockRepo {
        user_to_return: Some(sample_record("ana", Role::UpdateAddress)),
    };
    let state = create_app_state(repo);
    let token = create_token("ana", 3600, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.username, "ana");
    assert_eq!(auth_user.role, Role::UpdateAddress);
}

#[tokio::test]
async fn extractor_rejects_missing_header() {
    let state = create_app_state(MockRepo::default());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Malformed), "got {err:?}");
}

#[tokio::test]
async fn extractor_rejects_non_bearer_scheme() {
    let state = create_app_state(MockRepo::default());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Malformed), "got {err:?}");
}

#[tokio::test]
async fn extractor_rejects_token_for_deleted_subject() {
    // Token verifies, but the subject no longer exists in the store.
    let state = create_app_state(MockRepo::default());
    let token = create_token("ghost", 3600, TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials), "got {err:?}");
}
