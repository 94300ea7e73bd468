use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod parse;
pub mod repository;
pub mod roles;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application by
/// aggregating every handler decorated with `#[utoipa::path]` and every
/// schema decorated with `ToSchema`. The resulting JSON is served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login, handlers::auth::register, handlers::auth::me,
        handlers::auth::refresh, handlers::auth::logout,
        handlers::users::list_users, handlers::users::create_user, handlers::users::get_user,
        handlers::users::update_user, handlers::users::delete_user,
        handlers::users::list_roles, handlers::users::create_role,
        handlers::search::list_topics, handlers::search::create_topic,
        handlers::search::search_topics, handlers::search::get_topic,
        handlers::search::update_topic, handlers::search::delete_topic,
        handlers::search::get_details, handlers::search::create_details,
        handlers::search::update_details,
        handlers::search::list_scenes, handlers::search::create_scene,
        handlers::search::update_scene, handlers::search::delete_scene,
        handlers::search::list_videos, handlers::search::create_video,
        handlers::search::update_video, handlers::search::delete_video,
        handlers::explore::list_topics, handlers::explore::create_topic,
        handlers::explore::trending_topics, handlers::explore::search_topics,
        handlers::explore::get_topic, handlers::explore::update_topic,
        handlers::explore::delete_topic,
        handlers::keywords::list_keywords, handlers::keywords::create_keyword,
        handlers::keywords::search_keywords, handlers::keywords::trending_keywords,
        handlers::keywords::keyword_stats, handlers::keywords::get_keyword,
        handlers::keywords::update_keyword, handlers::keywords::delete_keyword,
        handlers::keywords::topics_for_keyword, handlers::keywords::link_topic,
        handlers::keywords::unlink_topic,
        handlers::dashboard::stats,
        handlers::seed::defaults, handlers::seed::clear_all, handlers::seed::reseed,
        handlers::logs::import,
    ),
    components(
        schemas(
            models::RoleRow, models::User, models::UserCreate, models::UserUpdate,
            models::LoginForm, models::Token, models::RoleCreate,
            models::SearchTopic, models::SearchTopicCreate, models::SearchTopicUpdate,
            models::SearchDetails, models::SearchDetailsCreate, models::SearchDetailsUpdate,
            models::ScriptScene, models::ScriptSceneCreate, models::ScriptSceneUpdate,
            models::RelatedVideo, models::RelatedVideoCreate, models::RelatedVideoUpdate,
            models::ExploreTopic, models::ExploreTopicCreate, models::ExploreTopicUpdate,
            models::Keyword, models::KeywordCreate, models::KeywordUpdate,
            models::TopicSummary, models::KeywordWithTopics,
            models::DashboardStats, models::KeywordStats,
            models::LogEntry, models::LogInfo, models::LogImportRequest,
            models::LogImportResponse, models::MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "trend-portal", description = "Trend metadata and script suggestion API")
    )
)]
struct ApiDoc;

/// Registers the bearer scheme referenced by the `security(...)` clauses on
/// the protected handlers.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across every incoming request.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors to selectively pull components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route group by running the
/// `AuthUser` extractor. A failed extraction (missing header, bad or expired
/// token, deleted user) rejects with 401 before any handler executes; role
/// checks stay inside the handlers and reject with 403.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the full routing structure, applies global and scoped
/// middleware, and registers the application state. The API surface is
/// versioned under `/api/v1`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: correlates every log line of a request by
/// its generated `x-request-id` alongside the method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
