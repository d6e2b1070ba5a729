use axum::{
    Form, Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        AddressView, CreateUserRequest, DeleteResponse, LoginForm, TokenResponse,
        UpdateUserRequest, UserView,
    },
};

/// login
///
/// [Public Route] Exchanges a username/password form body for a bearer
/// token. This is the only endpoint that accepts a credential; everything
/// else requires the token it returns.
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .service
        .authenticate(&form.username, &form.password)
        .await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// create_user
///
/// [Admin Route] Creates a record. The response view never includes the
/// credential hash.
#[utoipa::path(
    post,
    path = "/users/",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Created", body = UserView),
        (status = 400, description = "Field validation failed"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    let view = state.service.create(role, payload).await?;
    Ok(Json(view))
}

/// list_users
///
/// [Admin/Read Route] Every record's non-credential fields.
#[utoipa::path(
    get,
    path = "/users/",
    responses(
        (status = 200, description = "All records", body = [UserView]),
        (status = 403, description = "Caller may not read whole records")
    )
)]
pub async fn list_users(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let views = state.service.list_all(role).await?;
    Ok(Json(views))
}

/// list_addresses
///
/// [Admin/Read/UpdateAddress Route] The address-only projection of every
/// record, the widest view the `update_address` role may read.
#[utoipa::path(
    get,
    path = "/users/domicilio",
    responses(
        (status = 200, description = "All addresses", body = [AddressView]),
        (status = 403, description = "Role has no address access")
    )
)]
pub async fn list_addresses(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AddressView>>, ApiError> {
    let views = state.service.list_addresses(role).await?;
    Ok(Json(views))
}

/// replace_user
///
/// [Admin Route] Full overwrite of every field of an existing record. The
/// payload requires a password and the credential is always rehashed, even
/// when the supplied password value has not changed.
#[utoipa::path(
    put,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Identity key of the record")),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Replaced", body = UserView),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn replace_user(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    let view = state.service.replace(role, &username, payload).await?;
    Ok(Json(view))
}

/// patch_user
///
/// [Admin Route] Field-scoped partial update: only fields present in the
/// body are merged, a present password replaces only the stored hash.
#[utoipa::path(
    patch,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Identity key of the record")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Patched", body = UserView),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn patch_user(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    let view = state.service.patch(role, &username, payload).await?;
    Ok(Json(view))
}

/// patch_address
///
/// [Admin/UpdateAddress Route] Address-only patch. Any other field carried
/// with a concrete value is rejected with 403 regardless of the caller's
/// role; the restriction belongs to the operation, not the role.
#[utoipa::path(
    patch,
    path = "/users/domicilio/{username}",
    params(("username" = String, Path, description = "Identity key of the record")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Address patched", body = AddressView),
        (status = 403, description = "Denied role, or a non-address field was supplied"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn patch_address(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<AddressView>, ApiError> {
    let view = state.service.patch_address(role, &username, payload).await?;
    Ok(Json(view))
}

/// delete_user
///
/// [Admin Route] Hard delete; there is no soft-delete in this system.
#[utoipa::path(
    delete,
    path = "/users/{username}",
    params(("username" = String, Path, description = "Identity key of the record")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn delete_user(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.service.delete(role, &username).await?;
    Ok(Json(DeleteResponse {
        message: format!("user {username} deleted"),
    }))
}
