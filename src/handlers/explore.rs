use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{ExploreTopic, ExploreTopicCreate, ExploreTopicUpdate, MessageResponse},
    repository::TopicSort,
    roles::Role,
};

use super::{ListParams, MAX_LIMIT, SearchParams, TrendingParams, page, trending_limit};

/// list_topics
#[utoipa::path(
    get,
    path = "/explore/topics",
    params(ListParams),
    responses((status = 200, description = "Explore topics", body = [ExploreTopic])),
    security(("bearer_auth" = []))
)]
pub async fn list_topics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ExploreTopic>>, ApiError> {
    user.require(Role::Viewer)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    let sort = TopicSort::from_param(params.sort_by.as_deref());
    Ok(Json(state.repo.list_explore_topics(page, sort).await?))
}

/// create_topic
#[utoipa::path(
    post,
    path = "/explore/topics",
    request_body = ExploreTopicCreate,
    responses((status = 200, description = "Topic created", body = ExploreTopic)),
    security(("bearer_auth" = []))
)]
pub async fn create_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ExploreTopicCreate>,
) -> Result<Json<ExploreTopic>, ApiError> {
    user.require(Role::Editor)?;
    Ok(Json(state.repo.create_explore_topic(payload).await?))
}

/// trending_topics
///
/// Top rows by popularity, for the explore landing widget.
#[utoipa::path(
    get,
    path = "/explore/topics/trending",
    params(TrendingParams),
    responses((status = 200, description = "Trending topics", body = [ExploreTopic])),
    security(("bearer_auth" = []))
)]
pub async fn trending_topics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<ExploreTopic>>, ApiError> {
    user.require(Role::Viewer)?;
    let limit = trending_limit(params.limit)?;
    Ok(Json(state.repo.trending_explore_topics(limit).await?))
}

/// search_topics
#[utoipa::path(
    get,
    path = "/explore/topics/search",
    params(SearchParams),
    responses((status = 200, description = "Matching topics", body = [ExploreTopic])),
    security(("bearer_auth" = []))
)]
pub async fn search_topics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ExploreTopic>>, ApiError> {
    user.require(Role::Viewer)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    Ok(Json(
        state.repo.search_explore_topics(&params.q, page).await?,
    ))
}

/// get_topic
#[utoipa::path(
    get,
    path = "/explore/topics/{id}",
    responses(
        (status = 200, description = "Topic", body = ExploreTopic),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ExploreTopic>, ApiError> {
    user.require(Role::Viewer)?;
    let topic = state
        .repo
        .get_explore_topic(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Explore topic not found".into()))?;
    Ok(Json(topic))
}

/// update_topic
#[utoipa::path(
    put,
    path = "/explore/topics/{id}",
    request_body = ExploreTopicUpdate,
    responses(
        (status = 200, description = "Topic updated", body = ExploreTopic),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExploreTopicUpdate>,
) -> Result<Json<ExploreTopic>, ApiError> {
    user.require(Role::Editor)?;
    let topic = state
        .repo
        .update_explore_topic(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Explore topic not found".into()))?;
    Ok(Json(topic))
}

/// delete_topic
#[utoipa::path(
    delete,
    path = "/explore/topics/{id}",
    responses(
        (status = 200, description = "Topic deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    if !state.repo.delete_explore_topic(id).await? {
        return Err(ApiError::NotFound("Explore topic not found".into()));
    }
    Ok(Json(MessageResponse::new(
        "Explore topic deleted successfully",
    )))
}
