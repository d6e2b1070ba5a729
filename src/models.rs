use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to the JSON Store) ---

/// Role
///
/// The coarse capability label attached to every record. Authorization is a
/// pure function of this value and the requested operation (see `policy`).
/// Unknown role strings fail deserialization, so a malformed body is rejected
/// before any domain logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control: every operation on every field.
    Admin,
    /// Read-only access to whole records and addresses.
    Read,
    /// May read addresses and patch the `address` field of any record.
    UpdateAddress,
}

/// UserRecord
///
/// The canonical on-disk record, one element of the persisted JSON collection.
/// This is the only place the password hash lives; it is serialized to the
/// store and **never** into a response body (responses use `UserView`).
///
/// Invariant: every field of every stored record satisfies its `validate`
/// predicate, and `username` is unique across the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub curp: String,
    pub cp: String,
    pub rfc: String,
    pub phone: String,
    pub birthdate: String,
    pub address: String,
}

/// UserView
///
/// The response projection of a record: everything except the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub username: String,
    pub role: Role,
    pub curp: String,
    pub cp: String,
    pub rfc: String,
    pub phone: String,
    pub birthdate: String,
    pub address: String,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            role: record.role,
            curp: record.curp.clone(),
            cp: record.cp.clone(),
            rfc: record.rfc.clone(),
            phone: record.phone.clone(),
            birthdate: record.birthdate.clone(),
            address: record.address.clone(),
        }
    }
}

/// AddressView
///
/// The narrow projection served to the `update_address` role: only the
/// identity key and the one field that role may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddressView {
    pub username: String,
    pub address: String,
}

impl From<&UserRecord> for AddressView {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            address: record.address.clone(),
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Input payload for POST /users/ and PUT /users/{username}. Every field is
/// required, including the plaintext password: a full replace always rehashes
/// the credential, even when the caller supplies an unchanged password value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub curp: String,
    pub cp: String,
    pub rfc: String,
    pub phone: String,
    pub birthdate: String,
    pub address: String,
}

/// double_option
///
/// Deserializer distinguishing "field absent" from "field explicitly null":
/// absent stays `None` (via `#[serde(default)]`), a present value becomes
/// `Some(Some(v))`, and a literal JSON null becomes `Some(None)`. The patch
/// semantics need all three states: absent = unchanged, null = invalid for a
/// required string field, value = merge.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// UpdateUserRequest
///
/// Partial-update payload for PATCH /users/{username} and
/// PATCH /users/domicilio/{username}. Only fields present in the body are
/// merged into the stored record.
///
/// There is deliberately no `username` field: the identity key is immutable
/// after creation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub password: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Role>)]
    pub role: Option<Option<Role>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub curp: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cp: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub rfc: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub birthdate: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
}

impl UpdateUserRequest {
    /// Names of the fields carried with a concrete (non-null) value.
    /// This is the `requested_fields` set the authorization policy inspects.
    pub fn set_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if matches!(self.password, Some(Some(_))) {
            fields.push("password");
        }
        if matches!(self.role, Some(Some(_))) {
            fields.push("role");
        }
        if matches!(self.curp, Some(Some(_))) {
            fields.push("curp");
        }
        if matches!(self.cp, Some(Some(_))) {
            fields.push("cp");
        }
        if matches!(self.rfc, Some(Some(_))) {
            fields.push("rfc");
        }
        if matches!(self.phone, Some(Some(_))) {
            fields.push("phone");
        }
        if matches!(self.birthdate, Some(Some(_))) {
            fields.push("birthdate");
        }
        if matches!(self.address, Some(Some(_))) {
            fields.push("address");
        }
        fields
    }
}

// --- Auth Schemas ---

/// LoginForm
///
/// Form body for POST /token, mirroring the standard OAuth2 password flow
/// field names (`username`, `password`).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// TokenResponse
///
/// Output of a successful authentication: the signed bearer token plus the
/// fixed `token_type` marker clients expect.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// DeleteResponse
///
/// Confirmation body returned by DELETE /users/{username}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}
