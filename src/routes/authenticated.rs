use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Every route here resolves the caller through the `AuthUser` extractor, so
/// a missing or invalid token rejects with 401 before the handler body runs.
/// Minimum-role requirements (viewer < editor < admin < super_admin) are
/// checked per handler and reject with 403.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // --- Session ---
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        // --- User administration ---
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/users/me", get(handlers::auth::me))
        .route(
            "/users/roles",
            get(handlers::users::list_roles).post(handlers::users::create_role),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // --- Search topics and their drill-down ---
        .route(
            "/search/topics",
            get(handlers::search::list_topics).post(handlers::search::create_topic),
        )
        .route("/search/topics/search", get(handlers::search::search_topics))
        .route(
            "/search/topics/{id}",
            get(handlers::search::get_topic)
                .put(handlers::search::update_topic)
                .delete(handlers::search::delete_topic),
        )
        // GET/POST address the details by the owning topic id; PUT addresses
        // the details row by its own id.
        .route(
            "/search/details/{id}",
            get(handlers::search::get_details)
                .post(handlers::search::create_details)
                .put(handlers::search::update_details),
        )
        .route(
            "/search/details/{topic_id}/scenes",
            get(handlers::search::list_scenes).post(handlers::search::create_scene),
        )
        .route(
            "/search/scenes/{id}",
            put(handlers::search::update_scene).delete(handlers::search::delete_scene),
        )
        .route(
            "/search/details/{topic_id}/videos",
            get(handlers::search::list_videos).post(handlers::search::create_video),
        )
        .route(
            "/search/videos/{id}",
            put(handlers::search::update_video).delete(handlers::search::delete_video),
        )
        // --- Explore catalogue ---
        .route(
            "/explore/topics",
            get(handlers::explore::list_topics).post(handlers::explore::create_topic),
        )
        .route(
            "/explore/topics/trending",
            get(handlers::explore::trending_topics),
        )
        .route(
            "/explore/topics/search",
            get(handlers::explore::search_topics),
        )
        .route(
            "/explore/topics/{id}",
            get(handlers::explore::get_topic)
                .put(handlers::explore::update_topic)
                .delete(handlers::explore::delete_topic),
        )
        // --- Keywords ---
        .route(
            "/keywords",
            get(handlers::keywords::list_keywords).post(handlers::keywords::create_keyword),
        )
        .route("/keywords/search", get(handlers::keywords::search_keywords))
        .route(
            "/keywords/trending",
            get(handlers::keywords::trending_keywords),
        )
        .route("/keywords/stats", get(handlers::keywords::keyword_stats))
        .route(
            "/keywords/{id}",
            get(handlers::keywords::get_keyword)
                .put(handlers::keywords::update_keyword)
                .delete(handlers::keywords::delete_keyword),
        )
        .route(
            "/keywords/{id}/search-topics",
            get(handlers::keywords::topics_for_keyword),
        )
        .route(
            "/keywords/{id}/search-topics/{topic_id}",
            post(handlers::keywords::link_topic).delete(handlers::keywords::unlink_topic),
        )
        // --- Dashboards, seeding, ingestion ---
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/seed/defaults", post(handlers::seed::defaults))
        .route("/seed/clear-all", post(handlers::seed::clear_all))
        .route("/seed/reseed", post(handlers::seed::reseed))
        .route("/logs", post(handlers::logs::import))
}
