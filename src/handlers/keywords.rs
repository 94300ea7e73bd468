use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        Keyword, KeywordCreate, KeywordStats, KeywordUpdate, KeywordWithTopics, MessageResponse,
        TopicSummary,
    },
    repository::{KeywordSort, Page},
    roles::Role,
};

use super::{ListParams, MAX_LIMIT, SearchParams, TrendingParams, page, trending_limit};

/// list_keywords
#[utoipa::path(
    get,
    path = "/keywords",
    params(ListParams),
    responses((status = 200, description = "Keywords", body = [Keyword])),
    security(("bearer_auth" = []))
)]
pub async fn list_keywords(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Keyword>>, ApiError> {
    user.require(Role::Viewer)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    let sort = KeywordSort::from_param(params.sort_by.as_deref());
    Ok(Json(state.repo.list_keywords(page, sort).await?))
}

/// create_keyword
///
/// Keyword names are unique case-insensitively.
#[utoipa::path(
    post,
    path = "/keywords",
    request_body = KeywordCreate,
    responses(
        (status = 200, description = "Keyword created", body = Keyword),
        (status = 400, description = "Name already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_keyword(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<KeywordCreate>,
) -> Result<Json<Keyword>, ApiError> {
    user.require(Role::Editor)?;
    if state
        .repo
        .get_keyword_by_name(&payload.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Keyword already exists".into()));
    }
    Ok(Json(state.repo.create_keyword(payload).await?))
}

/// search_keywords
#[utoipa::path(
    get,
    path = "/keywords/search",
    params(SearchParams),
    responses((status = 200, description = "Matching keywords", body = [Keyword])),
    security(("bearer_auth" = []))
)]
pub async fn search_keywords(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Keyword>>, ApiError> {
    user.require(Role::Viewer)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    Ok(Json(state.repo.search_keywords(&params.q, page).await?))
}

/// trending_keywords
#[utoipa::path(
    get,
    path = "/keywords/trending",
    params(TrendingParams),
    responses((status = 200, description = "Trending keywords", body = [Keyword])),
    security(("bearer_auth" = []))
)]
pub async fn trending_keywords(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<Keyword>>, ApiError> {
    user.require(Role::Viewer)?;
    let limit = trending_limit(params.limit)?;
    Ok(Json(state.repo.trending_keywords(limit).await?))
}

/// keyword_stats
#[utoipa::path(
    get,
    path = "/keywords/stats",
    responses((status = 200, description = "Keyword aggregates", body = KeywordStats)),
    security(("bearer_auth" = []))
)]
pub async fn keyword_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<KeywordStats>, ApiError> {
    user.require(Role::Viewer)?;
    Ok(Json(state.repo.keyword_stats().await?))
}

/// get_keyword
///
/// The single-keyword view embeds the summaries of every linked topic.
#[utoipa::path(
    get,
    path = "/keywords/{id}",
    responses(
        (status = 200, description = "Keyword with topics", body = KeywordWithTopics),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_keyword(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<KeywordWithTopics>, ApiError> {
    user.require(Role::Viewer)?;
    let keyword = state
        .repo
        .get_keyword(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Keyword not found".into()))?;
    let search_topics = state
        .repo
        .topics_for_keyword(
            id,
            Page {
                skip: 0,
                limit: MAX_LIMIT,
            },
        )
        .await?;
    Ok(Json(KeywordWithTopics {
        keyword,
        search_topics,
    }))
}

/// update_keyword
#[utoipa::path(
    put,
    path = "/keywords/{id}",
    request_body = KeywordUpdate,
    responses(
        (status = 200, description = "Keyword updated", body = Keyword),
        (status = 400, description = "Name already exists"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_keyword(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<KeywordUpdate>,
) -> Result<Json<Keyword>, ApiError> {
    user.require(Role::Editor)?;
    if let Some(name) = &payload.name {
        if let Some(existing) = state.repo.get_keyword_by_name(name).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Keyword already exists".into()));
            }
        }
    }
    let keyword = state
        .repo
        .update_keyword(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Keyword not found".into()))?;
    Ok(Json(keyword))
}

/// delete_keyword
///
/// Join rows fall with the keyword; topics themselves are untouched.
#[utoipa::path(
    delete,
    path = "/keywords/{id}",
    responses(
        (status = 200, description = "Keyword deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_keyword(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    if !state.repo.delete_keyword(id).await? {
        return Err(ApiError::NotFound("Keyword not found".into()));
    }
    Ok(Json(MessageResponse::new("Keyword deleted successfully")))
}

/// topics_for_keyword
#[utoipa::path(
    get,
    path = "/keywords/{id}/search-topics",
    params(ListParams),
    responses(
        (status = 200, description = "Linked topics", body = [TopicSummary]),
        (status = 404, description = "Keyword not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn topics_for_keyword(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TopicSummary>>, ApiError> {
    user.require(Role::Viewer)?;
    if state.repo.get_keyword(id).await?.is_none() {
        return Err(ApiError::NotFound("Keyword not found".into()));
    }
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    Ok(Json(state.repo.topics_for_keyword(id, page).await?))
}

/// link_topic
///
/// Creates the keyword-topic association. A duplicate pair is a conflict; the
/// unique constraint under the insert makes the check race-free.
#[utoipa::path(
    post,
    path = "/keywords/{id}/search-topics/{topic_id}",
    responses(
        (status = 200, description = "Linked", body = MessageResponse),
        (status = 400, description = "Already linked"),
        (status = 404, description = "Keyword or topic not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn link_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, topic_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Editor)?;
    if state.repo.get_keyword(id).await?.is_none() {
        return Err(ApiError::NotFound("Keyword not found".into()));
    }
    if state.repo.get_search_topic(topic_id).await?.is_none() {
        return Err(ApiError::NotFound("Search topic not found".into()));
    }
    if !state.repo.link_keyword_topic(id, topic_id).await? {
        return Err(ApiError::Conflict(
            "Keyword is already linked to this topic".into(),
        ));
    }
    Ok(Json(MessageResponse::new(
        "Keyword linked to search topic",
    )))
}

/// unlink_topic
#[utoipa::path(
    delete,
    path = "/keywords/{id}/search-topics/{topic_id}",
    responses(
        (status = 200, description = "Unlinked", body = MessageResponse),
        (status = 404, description = "Link not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlink_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, topic_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Editor)?;
    if !state.repo.unlink_keyword_topic(id, topic_id).await? {
        return Err(ApiError::NotFound(
            "Keyword is not linked to this topic".into(),
        ));
    }
    Ok(Json(MessageResponse::new(
        "Keyword unlinked from search topic",
    )))
}
