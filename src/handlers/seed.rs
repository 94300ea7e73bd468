use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::MessageResponse,
    roles::Role,
};

/// defaults
///
/// Creates the four canonical roles and the bootstrap superadmin account.
/// Idempotent: rerunning against a seeded database changes nothing.
#[utoipa::path(
    post,
    path = "/seed/defaults",
    responses((status = 200, description = "Seeded", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn defaults(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    let hash = auth::hash_password(&state.config.bootstrap_admin_password)?;
    state.repo.seed_defaults(&hash).await?;
    Ok(Json(MessageResponse::new("Default data seeded")))
}

/// clear_all
///
/// Wipes every entity table, including users and roles. Destructive and
/// meant for test environments.
#[utoipa::path(
    post,
    path = "/seed/clear-all",
    responses((status = 200, description = "Cleared", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn clear_all(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    state.repo.clear_all().await?;
    Ok(Json(MessageResponse::new("All data cleared")))
}

/// reseed
///
/// clear-all followed by defaults, as one endpoint for test setups.
#[utoipa::path(
    post,
    path = "/seed/reseed",
    responses((status = 200, description = "Reseeded", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn reseed(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    state.repo.clear_all().await?;
    let hash = auth::hash_password(&state.config.bootstrap_admin_password)?;
    state.repo.seed_defaults(&hash).await?;
    Ok(Json(MessageResponse::new("Database reseeded")))
}
