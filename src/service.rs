use crate::{
    auth::TokenState,
    error::{ApiError, FieldError},
    models::{AddressView, CreateUserRequest, Role, UpdateUserRequest, UserRecord, UserView},
    password::{hash_password, verify_password},
    policy::{self, Decision, Operation},
    repository::{RecordPatch, RepositoryState},
    validate,
};

/// UserService
///
/// Orchestrates authentication, authorization and the record lifecycle on
/// top of the repository, the credential hasher and the token service.
///
/// Contract shared by every operation: the caller's role was already
/// resolved by the `AuthUser` extractor (token failures are the 401 tier);
/// each method consults the authorization policy *first*, so a denied caller
/// gets `Forbidden` before any store access, validation detail, or existence
/// information — and never causes a partial side effect.
#[derive(Clone)]
pub struct UserService {
    pub repo: RepositoryState,
    pub tokens: TokenState,
}

impl UserService {
    pub fn new(repo: RepositoryState, tokens: TokenState) -> Self {
        Self { repo, tokens }
    }

    fn authorize(&self, role: Role, op: Operation, fields: &[&str]) -> Result<(), ApiError> {
        match policy::decide(role, op, fields) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(ApiError::Forbidden),
        }
    }

    /// authenticate
    ///
    /// Verifies the credential and issues a bearer token for the subject.
    /// "No such user" and "wrong password" collapse into the same
    /// `InvalidCredentials` error to prevent username enumeration.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let Some(user) = self.repo.find(username).await else {
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_password(&user.password_hash, password) {
            return Err(ApiError::InvalidCredentials);
        }
        tracing::info!(username, "issuing token");
        self.tokens.issue(&user.username)
    }

    /// create
    ///
    /// Admin only. Validates every field (all failures enumerated), hashes
    /// the credential, and appends the record. `AlreadyExists` when the
    /// username is taken.
    pub async fn create(&self, caller: Role, req: CreateUserRequest) -> Result<UserView, ApiError> {
        self.authorize(caller, Operation::Create, &[])?;

        let errors = validate::validate_create(&req);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let record = UserRecord {
            username: req.username,
            password_hash: hash_password(&req.password)?,
            role: req.role,
            curp: req.curp,
            cp: req.cp,
            rfc: req.rfc,
            phone: req.phone,
            birthdate: req.birthdate,
            address: req.address,
        };
        let view = UserView::from(&record);

        if !self.repo.insert(record).await? {
            return Err(ApiError::AlreadyExists);
        }
        tracing::info!(username = %view.username, "user created");
        Ok(view)
    }

    /// list_all
    ///
    /// Admin or read. Every record's non-credential fields.
    pub async fn list_all(&self, caller: Role) -> Result<Vec<UserView>, ApiError> {
        self.authorize(caller, Operation::ListAll, &[])?;
        Ok(self.repo.list().await.iter().map(UserView::from).collect())
    }

    /// list_addresses
    ///
    /// Admin, read or update_address. Only (username, address) pairs.
    pub async fn list_addresses(&self, caller: Role) -> Result<Vec<AddressView>, ApiError> {
        self.authorize(caller, Operation::ListAddresses, &[])?;
        Ok(self.repo.list().await.iter().map(AddressView::from).collect())
    }

    /// replace
    ///
    /// Admin only. Full overwrite of every field, including an unconditional
    /// credential rehash (the password is a required field of the payload,
    /// even when it has not changed). Usernames are immutable: a body whose
    /// `username` differs from the path is a validation failure.
    pub async fn replace(
        &self,
        caller: Role,
        username: &str,
        req: CreateUserRequest,
    ) -> Result<UserView, ApiError> {
        self.authorize(caller, Operation::Replace, &[])?;

        let mut errors = validate::validate_create(&req);
        if req.username != username {
            errors.insert(
                0,
                FieldError::new("username", "must match the username in the request path"),
            );
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let record = UserRecord {
            username: req.username,
            password_hash: hash_password(&req.password)?,
            role: req.role,
            curp: req.curp,
            cp: req.cp,
            rfc: req.rfc,
            phone: req.phone,
            birthdate: req.birthdate,
            address: req.address,
        };

        match self.repo.replace(username, record).await? {
            Some(stored) => {
                tracing::info!(username, "user replaced");
                Ok(UserView::from(&stored))
            }
            None => Err(ApiError::NotFound),
        }
    }

    /// patch
    ///
    /// Admin only. Merges only the fields explicitly present in the payload;
    /// an absent field is unchanged and an explicit null is a validation
    /// failure. A present password is rehashed and replaces only the hash.
    pub async fn patch(
        &self,
        caller: Role,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<UserView, ApiError> {
        self.authorize(caller, Operation::Patch, &req.set_fields())?;

        let errors = validate::validate_patch(&req);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let password_hash = match req.password.clone().flatten() {
            Some(plaintext) => Some(hash_password(&plaintext)?),
            None => None,
        };
        let patch = RecordPatch {
            password_hash,
            role: req.role.flatten(),
            curp: req.curp.clone().flatten(),
            cp: req.cp.clone().flatten(),
            rfc: req.rfc.clone().flatten(),
            phone: req.phone.clone().flatten(),
            birthdate: req.birthdate.clone().flatten(),
            address: req.address.clone().flatten(),
        };

        match self.repo.merge(username, patch).await? {
            Some(stored) => {
                tracing::info!(username, "user patched");
                Ok(UserView::from(&stored))
            }
            None => Err(ApiError::NotFound),
        }
    }

    /// patch_address
    ///
    /// Admin or update_address, but the single-field restriction is
    /// operation-scoped: any field besides `address` carried with a concrete
    /// value is `Forbidden` regardless of role. Null or absent extra fields
    /// are tolerated (omitted, not violated). The address itself must be
    /// present with a valid value.
    pub async fn patch_address(
        &self,
        caller: Role,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<AddressView, ApiError> {
        self.authorize(caller, Operation::PatchAddress, &req.set_fields())?;

        let address = match &req.address {
            None => {
                return Err(ApiError::Validation(vec![FieldError::new(
                    "address",
                    "is required for this operation",
                )]));
            }
            Some(None) => {
                return Err(ApiError::Validation(vec![FieldError::new(
                    "address",
                    "must not be null",
                )]));
            }
            Some(Some(v)) => {
                if !validate::valid_address(v) {
                    return Err(ApiError::Validation(vec![FieldError::new(
                        "address",
                        "contains characters outside the allowed set or is empty",
                    )]));
                }
                v.clone()
            }
        };

        let patch = RecordPatch {
            address: Some(address),
            ..RecordPatch::default()
        };

        match self.repo.merge(username, patch).await? {
            Some(stored) => {
                tracing::info!(username, "address patched");
                Ok(AddressView::from(&stored))
            }
            None => Err(ApiError::NotFound),
        }
    }

    /// delete
    ///
    /// Admin only. Hard delete; `NotFound` when the username is absent.
    pub async fn delete(&self, caller: Role, username: &str) -> Result<(), ApiError> {
        self.authorize(caller, Operation::Delete, &[])?;
        if !self.repo.remove(username).await? {
            return Err(ApiError::NotFound);
        }
        tracing::info!(username, "user deleted");
        Ok(())
    }
}
