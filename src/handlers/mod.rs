use serde::Deserialize;

use crate::error::ApiError;
use crate::repository::Page;

pub mod auth;
pub mod dashboard;
pub mod explore;
pub mod keywords;
pub mod logs;
pub mod search;
pub mod seed;
pub mod users;

/// Pagination caps. Trending endpoints are bounded tighter since they feed
/// small ranked widgets.
pub const MAX_LIMIT: i64 = 100;
pub const MAX_TRENDING_LIMIT: i64 = 50;
pub const DEFAULT_TRENDING_LIMIT: i64 = 10;

/// ListParams
///
/// Query parameters accepted by every paginated listing endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    /// Rows to skip from the start of the ordering.
    pub skip: Option<i64>,
    /// Page size, 1..=100.
    pub limit: Option<i64>,
    /// Sort key; unknown values fall back to insertion order.
    pub sort_by: Option<String>,
}

/// SearchParams
///
/// Query parameters for the substring-search endpoints.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring to look for.
    pub q: String,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// TrendingParams
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TrendingParams {
    /// Number of rows to return, 1..=50.
    pub limit: Option<i64>,
}

/// Validates a pagination window at the handler boundary. Out-of-range values
/// reject with 400 rather than being clamped.
pub(crate) fn page(skip: Option<i64>, limit: Option<i64>, max: i64) -> Result<Page, ApiError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(max);
    if skip < 0 {
        return Err(ApiError::Validation("skip must be non-negative".into()));
    }
    if !(1..=max).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {max}"
        )));
    }
    Ok(Page { skip, limit })
}

pub(crate) fn trending_limit(limit: Option<i64>) -> Result<i64, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_TRENDING_LIMIT);
    if !(1..=MAX_TRENDING_LIMIT).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {MAX_TRENDING_LIMIT}"
        )));
    }
    Ok(limit)
}
