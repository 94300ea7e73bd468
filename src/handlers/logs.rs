use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{ExploreTopicCreate, LogImportRequest, LogImportResponse},
    parse,
    roles::Role,
};

/// import
///
/// Ingests a scraped trend batch. Each entry with a title becomes an explore
/// topic; popularity comes from the lenient magnitude parser (0.0 when
/// unparsable, the row is still imported) and the ai_tip is derived from the
/// trend percent when one parses. Titleless entries are skipped. The whole
/// batch lands in one transaction.
#[utoipa::path(
    post,
    path = "/logs",
    request_body = LogImportRequest,
    responses((status = 200, description = "Batch imported", body = LogImportResponse)),
    security(("bearer_auth" = []))
)]
pub async fn import(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<LogImportRequest>,
) -> Result<Json<LogImportResponse>, ApiError> {
    user.require(Role::Editor)?;

    let rows: Vec<ExploreTopicCreate> = payload
        .log
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title?;
            let popularity = entry
                .search_popularity
                .as_deref()
                .and_then(parse::parse_magnitude)
                .unwrap_or(0.0);
            let ai_tip = entry
                .trend_percent
                .as_deref()
                .and_then(parse::parse_percent)
                .map(|p| format!("search interest {p:+.1}% vs previous period"));
            Some(ExploreTopicCreate {
                title,
                popularity,
                ai_tip,
            })
        })
        .collect();

    let keyword = payload.info.keyword.unwrap_or_default();
    tracing::info!(keyword = %keyword, entries = rows.len(), "importing trend log batch");

    let imported = state.repo.import_explore_topics(rows).await?;
    Ok(Json(LogImportResponse { imported, keyword }))
}
