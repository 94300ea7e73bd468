use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        MessageResponse, RelatedVideo, RelatedVideoCreate, RelatedVideoUpdate, ScriptScene,
        ScriptSceneCreate, ScriptSceneUpdate, SearchDetails, SearchDetailsCreate,
        SearchDetailsUpdate, SearchTopic, SearchTopicCreate, SearchTopicUpdate,
    },
    repository::TopicSort,
    roles::Role,
};

use super::{ListParams, MAX_LIMIT, SearchParams, page};

// --- Topics ---

/// list_topics
#[utoipa::path(
    get,
    path = "/search/topics",
    params(ListParams),
    responses((status = 200, description = "Search topics", body = [SearchTopic])),
    security(("bearer_auth" = []))
)]
pub async fn list_topics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SearchTopic>>, ApiError> {
    user.require(Role::Viewer)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    let sort = TopicSort::from_param(params.sort_by.as_deref());
    Ok(Json(state.repo.list_search_topics(page, sort).await?))
}

/// create_topic
#[utoipa::path(
    post,
    path = "/search/topics",
    request_body = SearchTopicCreate,
    responses((status = 200, description = "Topic created", body = SearchTopic)),
    security(("bearer_auth" = []))
)]
pub async fn create_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SearchTopicCreate>,
) -> Result<Json<SearchTopic>, ApiError> {
    user.require(Role::Editor)?;
    Ok(Json(state.repo.create_search_topic(payload).await?))
}

/// search_topics
///
/// Substring match across title, ai_tips and quick_actions.
#[utoipa::path(
    get,
    path = "/search/topics/search",
    params(SearchParams),
    responses((status = 200, description = "Matching topics", body = [SearchTopic])),
    security(("bearer_auth" = []))
)]
pub async fn search_topics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchTopic>>, ApiError> {
    user.require(Role::Viewer)?;
    let page = page(params.skip, params.limit, MAX_LIMIT)?;
    Ok(Json(
        state.repo.search_search_topics(&params.q, page).await?,
    ))
}

/// get_topic
#[utoipa::path(
    get,
    path = "/search/topics/{id}",
    responses(
        (status = 200, description = "Topic", body = SearchTopic),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SearchTopic>, ApiError> {
    user.require(Role::Viewer)?;
    let topic = state
        .repo
        .get_search_topic(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Search topic not found".into()))?;
    Ok(Json(topic))
}

/// update_topic
#[utoipa::path(
    put,
    path = "/search/topics/{id}",
    request_body = SearchTopicUpdate,
    responses(
        (status = 200, description = "Topic updated", body = SearchTopic),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_topic(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SearchTopicUpdate>,
) -> Result<Json<SearchTopic>, ApiError> {
    user.require(Role::Editor)?;
    let topic = state
        .repo
        .update_search_topic(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Search topic not found".into()))?;
    Ok(Json(topic))
}

/// delete_topic
///
/// Cascades to the details record and everything under it.
#[utoipa::path(
    delete,
    path = "/search/topics/{id}",
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
    if !state.repo.delete_search_topic(id).await? {
        return Err(ApiError::NotFound("Search topic not found".into()));
    }
    Ok(Json(MessageResponse::new(
        "Search topic deleted successfully",
    )))
}

// --- Details ---

/// Resolves the single details record belonging to a topic, 404 when the
/// topic has none yet.
async fn details_for_topic(state: &AppState, topic_id: i64) -> Result<SearchDetails, ApiError> {
    state
        .repo
        .get_details_for_topic(topic_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Search details not found".into()))
}

/// get_details
#[utoipa::path(
    get,
    path = "/search/details/{topic_id}",
    responses(
        (status = 200, description = "Details", body = SearchDetails),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_details(
    user: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<SearchDetails>, ApiError> {
    user.require(Role::Viewer)?;
    Ok(Json(details_for_topic(&state, topic_id).await?))
}

/// create_details
///
/// A topic owns at most one details record; a second create is rejected with
/// a conflict (the unique constraint on search_topic_id backs this check).
#[utoipa::path(
    post,
    path = "/search/details/{topic_id}",
    request_body = SearchDetailsCreate,
    responses(
        (status = 200, description = "Details created", body = SearchDetails),
        (status = 400, description = "Details already exist"),
        (status = 404, description = "Topic not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_details(
    user: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
    Json(payload): Json<SearchDetailsCreate>,
) -> Result<Json<SearchDetails>, ApiError> {
    user.require(Role::Editor)?;
    if state.repo.get_search_topic(topic_id).await?.is_none() {
        return Err(ApiError::NotFound("Search topic not found".into()));
    }
    if state.repo.get_details_for_topic(topic_id).await?.is_some() {
        return Err(ApiError::Conflict(
            "Search details already exist for this topic".into(),
        ));
    }
    Ok(Json(state.repo.create_details(topic_id, payload).await?))
}

/// update_details
#[utoipa::path(
    put,
    path = "/search/details/{details_id}",
    request_body = SearchDetailsUpdate,
    responses(
        (status = 200, description = "Details updated", body = SearchDetails),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_details(
    user: AuthUser,
    State(state): State<AppState>,
    Path(details_id): Path<i64>,
    Json(payload): Json<SearchDetailsUpdate>,
) -> Result<Json<SearchDetails>, ApiError> {
    user.require(Role::Editor)?;
    let details = state
        .repo
        .update_details(details_id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Search details not found".into()))?;
    Ok(Json(details))
}

// --- Script scenes ---

/// list_scenes
///
/// Scenes of the topic's details record, ordered by scene number.
#[utoipa::path(
    get,
    path = "/search/details/{topic_id}/scenes",
    responses(
        (status = 200, description = "Scenes", body = [ScriptScene]),
        (status = 404, description = "No details for topic")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_scenes(
    user: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<Vec<ScriptScene>>, ApiError> {
    user.require(Role::Viewer)?;
    let details = details_for_topic(&state, topic_id).await?;
    Ok(Json(state.repo.list_scenes(details.id).await?))
}

/// create_scene
#[utoipa::path(
    post,
    path = "/search/details/{topic_id}/scenes",
    request_body = ScriptSceneCreate,
    responses(
        (status = 200, description = "Scene created", body = ScriptScene),
        (status = 404, description = "No details for topic")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_scene(
    user: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
    Json(payload): Json<ScriptSceneCreate>,
) -> Result<Json<ScriptScene>, ApiError> {
    user.require(Role::Editor)?;
    let details = details_for_topic(&state, topic_id).await?;
    Ok(Json(state.repo.create_scene(details.id, payload).await?))
}

/// update_scene
#[utoipa::path(
    put,
    path = "/search/scenes/{id}",
    request_body = ScriptSceneUpdate,
    responses(
        (status = 200, description = "Scene updated", body = ScriptScene),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_scene(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ScriptSceneUpdate>,
) -> Result<Json<ScriptScene>, ApiError> {
    user.require(Role::Editor)?;
    let scene = state
        .repo
        .update_scene(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Script scene not found".into()))?;
    Ok(Json(scene))
}

/// delete_scene
#[utoipa::path(
    delete,
    path = "/search/scenes/{id}",
    responses(
        (status = 200, description = "Scene deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_scene(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    if !state.repo.delete_scene(id).await? {
        return Err(ApiError::NotFound("Script scene not found".into()));
    }
    Ok(Json(MessageResponse::new(
        "Script scene deleted successfully",
    )))
}

// --- Related videos ---

/// list_videos
///
/// Reference videos of the topic's details record, most viewed first.
#[utoipa::path(
    get,
    path = "/search/details/{topic_id}/videos",
    responses(
        (status = 200, description = "Videos", body = [RelatedVideo]),
        (status = 404, description = "No details for topic")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_videos(
    user: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<Vec<RelatedVideo>>, ApiError> {
    user.require(Role::Viewer)?;
    let details = details_for_topic(&state, topic_id).await?;
    Ok(Json(state.repo.list_videos(details.id).await?))
}

/// create_video
#[utoipa::path(
    post,
    path = "/search/details/{topic_id}/videos",
    request_body = RelatedVideoCreate,
    responses(
        (status = 200, description = "Video created", body = RelatedVideo),
        (status = 404, description = "No details for topic")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_video(
    user: AuthUser,
    State(state): State<AppState>,
    Path(topic_id): Path<i64>,
    Json(payload): Json<RelatedVideoCreate>,
) -> Result<Json<RelatedVideo>, ApiError> {
    user.require(Role::Editor)?;
    let details = details_for_topic(&state, topic_id).await?;
    Ok(Json(state.repo.create_video(details.id, payload).await?))
}

/// update_video
#[utoipa::path(
    put,
    path = "/search/videos/{id}",
    request_body = RelatedVideoUpdate,
    responses(
        (status = 200, description = "Video updated", body = RelatedVideo),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_video(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RelatedVideoUpdate>,
) -> Result<Json<RelatedVideo>, ApiError> {
    user.require(Role::Editor)?;
    let video = state
        .repo
        .update_video(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Related video not found".into()))?;
    Ok(Json(video))
}

/// delete_video
#[utoipa::path(
    delete,
    path = "/search/videos/{id}",
    responses(
        (status = 200, description = "Video deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_video(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require(Role::Admin)?;
    if !state.repo.delete_video(id).await? {
        return Err(ApiError::NotFound("Related video not found".into()));
    }
    Ok(Json(MessageResponse::new(
        "Related video deleted successfully",
    )))
}
