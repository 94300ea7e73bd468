use axum::{Json, extract::State};

use crate::{
    AppState, auth::AuthUser, error::ApiError, models::DashboardStats, roles::Role,
};

/// stats
///
/// Aggregate entity counts for the admin dashboard. recent_activity is an
/// empty placeholder list until an audit log exists to back it.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    responses((status = 200, description = "Dashboard aggregates", body = DashboardStats)),
    security(("bearer_auth" = []))
)]
pub async fn stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    user.require(Role::Admin)?;
    Ok(Json(state.repo.dashboard_stats().await?))
}
