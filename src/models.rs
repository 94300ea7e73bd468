use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

/// double_option
///
/// Deserialization helper distinguishing "field absent" from "field: null" in
/// partial-update payloads: absent deserializes to `None` (leave untouched),
/// an explicit null to `Some(None)` (clear the column), and a value to
/// `Some(Some(v))`. Apply with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn default_popularity() -> f64 {
    0.0
}

fn default_time_range() -> String {
    "last 7 days".to_string()
}

fn default_region() -> String {
    "Global".to_string()
}

// --- Users & Roles ---

/// A row of the closed `roles` table. Exactly one row exists per canonical name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
}

/// User
///
/// The public view of a user account. The role name is denormalized into the
/// row via a JOIN so that authorization never needs a second lookup. The
/// password hash is deliberately absent; see `UserRecord`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role_id: i64,
    pub role: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// UserRecord
///
/// Internal row including the argon2 password hash. Only the authentication
/// path sees this type; it never crosses the HTTP boundary.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn into_public(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            role_id: self.role_id,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input payload for registration and administrative user creation. The
/// register endpoint ignores `role_id` and always assigns the viewer role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
}

/// Validated insert arguments built by the handlers (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
}

/// Partial update for a user profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
}

/// Form-encoded login credentials (`POST /auth/login`).
#[derive(Debug, Clone, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Bearer token response for login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Input payload for role creation (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RoleCreate {
    pub name: String,
}

// --- Search Topics ---

/// SearchTopic
///
/// A trending search subject with its popularity score and editorial text.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SearchTopic {
    pub id: i64,
    pub title: String,
    pub popularity: f64,
    pub ai_tips: Option<String>,
    pub quick_actions: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SearchTopicCreate {
    pub title: String,
    #[serde(default = "default_popularity")]
    pub popularity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_tips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_actions: Option<String>,
}

/// Partial update: absent fields stay untouched; explicit null clears the
/// nullable text columns.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SearchTopicUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub ai_tips: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub quick_actions: Option<Option<String>>,
}

// --- Search Details (1:1 with a topic) ---

/// SearchDetails
///
/// The single drill-down record a topic may own. The unique foreign key on
/// `search_topic_id` enforces the 1:1 shape at the schema level.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SearchDetails {
    pub id: i64,
    pub search_topic_id: i64,
    pub popularity_value: f64,
    pub time_range: String,
    pub region: String,
    pub suggested_title: Option<String>,
    pub suggested_hashtags: Option<String>,
    pub suggested_script: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SearchDetailsCreate {
    #[serde(default = "default_popularity")]
    pub popularity_value: f64,
    #[serde(default = "default_time_range")]
    pub time_range: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_hashtags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_script: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SearchDetailsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub suggested_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub suggested_hashtags: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub suggested_script: Option<Option<String>>,
}

// --- Script Scenes ---

/// ScriptScene
///
/// An ordered beat of a suggested video script. `scene_number` is assigned by
/// the caller; duplicates and gaps are accepted, listing sorts by it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ScriptScene {
    pub id: i64,
    pub detail_id: i64,
    pub scene_number: i64,
    pub visual_description: String,
    pub voice_over: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ScriptSceneCreate {
    pub scene_number: i64,
    pub visual_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_over: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ScriptSceneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_description: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub voice_over: Option<Option<String>>,
}

// --- Related Videos ---

/// RelatedVideo
///
/// A reference video attached to a details record; the view count drives the
/// default descending ordering.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RelatedVideo {
    pub id: i64,
    pub detail_id: i64,
    pub title: String,
    pub creator: String,
    pub views: i64,
    pub hashtags: Option<String>,
    pub video_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RelatedVideoCreate {
    pub title: String,
    pub creator: String,
    #[serde(default)]
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RelatedVideoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<Option<String>>,
}

// --- Explore Topics ---

/// ExploreTopic
///
/// Structurally parallel to SearchTopic but an independent catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ExploreTopic {
    pub id: i64,
    pub title: String,
    pub popularity: f64,
    pub ai_tip: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ExploreTopicCreate {
    pub title: String,
    #[serde(default = "default_popularity")]
    pub popularity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_tip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ExploreTopicUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub ai_tip: Option<Option<String>>,
}

// --- Keywords ---

/// Keyword
///
/// `topics_count` is a denormalized mirror of the join-table count for this
/// keyword, recomputed transactionally on every link and unlink.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Keyword {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub popularity: f64,
    pub is_trending: bool,
    pub topics_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct KeywordCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_popularity")]
    pub popularity: f64,
    #[serde(default)]
    pub is_trending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct KeywordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trending: Option<bool>,
}

/// Compact topic projection used when listing the topics tied to a keyword.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TopicSummary {
    pub id: i64,
    pub title: String,
    pub popularity: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Detail response for a single keyword: the keyword plus its related topics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct KeywordWithTopics {
    #[serde(flatten)]
    #[ts(flatten)]
    pub keyword: Keyword,
    pub search_topics: Vec<TopicSummary>,
}

// --- Dashboards & Stats ---

/// Aggregate counts for the administrative dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_search_topics: i64,
    pub total_explore_topics: i64,
    pub total_videos: i64,
    #[ts(type = "unknown[]")]
    pub recent_activity: Vec<serde_json::Value>,
}

/// Aggregates over the keyword catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct KeywordStats {
    pub total_keywords: i64,
    pub trending_keywords: i64,
    pub total_relationships: i64,
    pub avg_popularity: f64,
}

// --- Log ingestion ---

/// One scraped trend entry. Field names match the scraper's camelCase payload;
/// the magnitude and percent strings are parsed leniently on import.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LogEntry {
    pub title: Option<String>,
    #[serde(rename = "searchPopularity")]
    pub search_popularity: Option<String>,
    #[serde(rename = "trendPercent")]
    pub trend_percent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LogInfo {
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LogImportRequest {
    pub log: Vec<LogEntry>,
    pub info: LogInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LogImportResponse {
    pub imported: u64,
    pub keyword: String,
}

/// Uniform `{"message": ...}` body for delete and seed confirmations.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
