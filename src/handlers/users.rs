use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{MessageResponse, NewUser, RoleCreate, RoleRow, User, UserCreate, UserUpdate},
    roles::Role,
};

use super::{ListParams, MAX_LIMIT, page};

/// list_users
#[utoipa::path(
    get,
    path = "/users",
    params(ListParams),
    responses((status = 200, description = "Users", body = [User])),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    user.require(Role::Admin)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    Ok(Json(state.repo.list_users(page).await?))
}

/// create_user
///
/// Administrative account creation. Unlike self-registration the payload may
/// carry a role_id; when absent the account defaults to viewer.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreate,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, description = "Username or email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<Json<User>, ApiError> {
    user.require(Role::Admin)?;

    if state
        .repo
        .get_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already registered".into()));
    }
    if state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let role_id = match payload.role_id {
        Some(id) => id,
        None => {
            state
                .repo
                .get_role_by_name("viewer")
                .await?
                .ok_or_else(|| ApiError::Validation("Default role not found".into()))?
                .id
        }
    };

    let password_hash = auth::hash_password(&payload.password)?;
    let created = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            role_id,
        })
        .await?;
    Ok(Json(created))
}

/// get_user
#[utoipa::path(
    get,
    path = "/users/{id}",
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    user.require(Role::Admin)?;
    let found = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(found))
}

/// update_user
///
/// Requires at least editor rank. Callers below admin rank may only touch
/// their own profile, and only an admin may reassign a role.
#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Not your profile"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    user.require(Role::Editor)?;
    if user.id != id {
        user.require(Role::Admin)?;
    }
    if payload.role_id.is_some() {
        user.require(Role::Admin)?;
    }

    if let Some(username) = &payload.username {
        if let Some(existing) = state.repo.get_user_by_username(username).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Username already registered".into()));
            }
        }
    }
    if let Some(email) = &payload.email {
        if let Some(existing) = state.repo.get_user_by_email(email).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
        }
    }

    let updated = state
        .repo
        .update_user(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(updated))
}

/// delete_user
///
/// Admins may remove any account except their own; the self-check prevents a
/// lockout of the last administrator.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    if user.id == id {
        return Err(ApiError::Validation(
            "Cannot delete your own account".into(),
        ));
    }
    if !state.repo.delete_user(id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// list_roles
#[utoipa::path(
    get,
    path = "/users/roles",
    responses((status = 200, description = "Roles", body = [RoleRow])),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleRow>>, ApiError> {
    user.require(Role::Admin)?;
    Ok(Json(state.repo.list_roles().await?))
}

/// create_role
#[utoipa::path(
    post,
    path = "/users/roles",
    request_body = RoleCreate,
    responses(
        (status = 200, description = "Role created", body = RoleRow),
        (status = 400, description = "Role already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<RoleCreate>,
) -> Result<Json<RoleRow>, ApiError> {
    user.require(Role::Admin)?;
    if state.repo.get_role_by_name(&payload.name).await?.is_some() {
        return Err(ApiError::Conflict("Role already exists".into()));
    }
    Ok(Json(state.repo.create_role(&payload.name).await?))
}
