use crate::models::{
    DashboardStats, ExploreTopic, ExploreTopicCreate, ExploreTopicUpdate, Keyword, KeywordCreate,
    KeywordStats, KeywordUpdate, NewUser, RelatedVideo, RelatedVideoCreate, RelatedVideoUpdate,
    RoleRow, ScriptScene, ScriptSceneCreate, ScriptSceneUpdate, SearchDetails, SearchDetailsCreate,
    SearchDetailsUpdate, SearchTopic, SearchTopicCreate, SearchTopicUpdate, TopicSummary, User,
    UserRecord, UserUpdate,
};
use crate::roles::Role;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;

/// Page
///
/// Validated pagination window. Constructed once at the handler boundary so
/// the repository never sees out-of-range values.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

/// TopicSort
///
/// Enumerated sort keys for topic listings. An unrecognized key from the
/// client silently falls back to insertion order rather than erroring, which
/// preserves the upstream service's permissive contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicSort {
    Popularity,
    Title,
    CreatedAt,
    Insertion,
}

impl TopicSort {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None | Some("popularity") => TopicSort::Popularity,
            Some("title") => TopicSort::Title,
            Some("created_at") => TopicSort::CreatedAt,
            Some(_) => TopicSort::Insertion,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            TopicSort::Popularity => "popularity DESC",
            TopicSort::Title => "title ASC",
            TopicSort::CreatedAt => "created_at DESC",
            TopicSort::Insertion => "id ASC",
        }
    }
}

/// KeywordSort
///
/// Same fallback contract as `TopicSort`, with the extra `topics_count` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSort {
    Popularity,
    Name,
    CreatedAt,
    TopicsCount,
    Insertion,
}

impl KeywordSort {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None | Some("popularity") => KeywordSort::Popularity,
            Some("name") => KeywordSort::Name,
            Some("created_at") => KeywordSort::CreatedAt,
            Some("topics_count") => KeywordSort::TopicsCount,
            Some(_) => KeywordSort::Insertion,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            KeywordSort::Popularity => "popularity DESC",
            KeywordSort::Name => "name ASC",
            KeywordSort::CreatedAt => "created_at DESC",
            KeywordSort::TopicsCount => "topics_count DESC",
            KeywordSort::Insertion => "id ASC",
        }
    }
}

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers depend on
/// this trait object rather than on Postgres, which keeps them testable
/// against an in-memory fake and keeps every SQL detail in one layer.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users & roles ---
    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    /// Looks up a user by username OR email, returning the internal record
    /// with the password hash. Used only by the authentication path.
    async fn get_user_record(&self, identifier: &str) -> Result<Option<UserRecord>, sqlx::Error>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn list_users(&self, page: Page) -> Result<Vec<User>, sqlx::Error>;
    async fn create_user(&self, new: NewUser) -> Result<User, sqlx::Error>;
    async fn update_user(&self, id: i64, upd: UserUpdate) -> Result<Option<User>, sqlx::Error>;
    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error>;
    async fn list_roles(&self) -> Result<Vec<RoleRow>, sqlx::Error>;
    async fn get_role_by_name(&self, name: &str) -> Result<Option<RoleRow>, sqlx::Error>;
    async fn create_role(&self, name: &str) -> Result<RoleRow, sqlx::Error>;

    // --- Search topics ---
    async fn list_search_topics(
        &self,
        page: Page,
        sort: TopicSort,
    ) -> Result<Vec<SearchTopic>, sqlx::Error>;
    async fn get_search_topic(&self, id: i64) -> Result<Option<SearchTopic>, sqlx::Error>;
    async fn create_search_topic(
        &self,
        new: SearchTopicCreate,
    ) -> Result<SearchTopic, sqlx::Error>;
    async fn update_search_topic(
        &self,
        id: i64,
        upd: SearchTopicUpdate,
    ) -> Result<Option<SearchTopic>, sqlx::Error>;
    async fn delete_search_topic(&self, id: i64) -> Result<bool, sqlx::Error>;
    /// Case-insensitive substring match OR'ed across title, ai_tips and
    /// quick_actions.
    async fn search_search_topics(
        &self,
        q: &str,
        page: Page,
    ) -> Result<Vec<SearchTopic>, sqlx::Error>;

    // --- Search details (1:1 with a topic) ---
    async fn get_details_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Option<SearchDetails>, sqlx::Error>;
    async fn get_details(&self, id: i64) -> Result<Option<SearchDetails>, sqlx::Error>;
    async fn create_details(
        &self,
        topic_id: i64,
        new: SearchDetailsCreate,
    ) -> Result<SearchDetails, sqlx::Error>;
    async fn update_details(
        &self,
        id: i64,
        upd: SearchDetailsUpdate,
    ) -> Result<Option<SearchDetails>, sqlx::Error>;

    // --- Script scenes ---
    async fn list_scenes(&self, detail_id: i64) -> Result<Vec<ScriptScene>, sqlx::Error>;
    async fn create_scene(
        &self,
        detail_id: i64,
        new: ScriptSceneCreate,
    ) -> Result<ScriptScene, sqlx::Error>;
    async fn update_scene(
        &self,
        id: i64,
        upd: ScriptSceneUpdate,
    ) -> Result<Option<ScriptScene>, sqlx::Error>;
    async fn delete_scene(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Related videos ---
    async fn list_videos(&self, detail_id: i64) -> Result<Vec<RelatedVideo>, sqlx::Error>;
    async fn create_video(
        &self,
        detail_id: i64,
        new: RelatedVideoCreate,
    ) -> Result<RelatedVideo, sqlx::Error>;
    async fn update_video(
        &self,
        id: i64,
        upd: RelatedVideoUpdate,
    ) -> Result<Option<RelatedVideo>, sqlx::Error>;
    async fn delete_video(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Explore topics ---
    async fn list_explore_topics(
        &self,
        page: Page,
        sort: TopicSort,
    ) -> Result<Vec<ExploreTopic>, sqlx::Error>;
    async fn get_explore_topic(&self, id: i64) -> Result<Option<ExploreTopic>, sqlx::Error>;
    async fn create_explore_topic(
        &self,
        new: ExploreTopicCreate,
    ) -> Result<ExploreTopic, sqlx::Error>;
    async fn update_explore_topic(
        &self,
        id: i64,
        upd: ExploreTopicUpdate,
    ) -> Result<Option<ExploreTopic>, sqlx::Error>;
    async fn delete_explore_topic(&self, id: i64) -> Result<bool, sqlx::Error>;
    async fn search_explore_topics(
        &self,
        q: &str,
        page: Page,
    ) -> Result<Vec<ExploreTopic>, sqlx::Error>;
    async fn trending_explore_topics(&self, limit: i64) -> Result<Vec<ExploreTopic>, sqlx::Error>;
    /// Inserts a scraped batch in a single transaction; a storage failure
    /// rolls back the whole batch. Returns the number of rows inserted.
    async fn import_explore_topics(
        &self,
        rows: Vec<ExploreTopicCreate>,
    ) -> Result<u64, sqlx::Error>;

    // --- Keywords ---
    async fn list_keywords(
        &self,
        page: Page,
        sort: KeywordSort,
    ) -> Result<Vec<Keyword>, sqlx::Error>;
    async fn get_keyword(&self, id: i64) -> Result<Option<Keyword>, sqlx::Error>;
    /// Case-insensitive name lookup; backs the application-level uniqueness
    /// check on keyword names.
    async fn get_keyword_by_name(&self, name: &str) -> Result<Option<Keyword>, sqlx::Error>;
    async fn create_keyword(&self, new: KeywordCreate) -> Result<Keyword, sqlx::Error>;
    async fn update_keyword(
        &self,
        id: i64,
        upd: KeywordUpdate,
    ) -> Result<Option<Keyword>, sqlx::Error>;
    async fn delete_keyword(&self, id: i64) -> Result<bool, sqlx::Error>;
    async fn search_keywords(&self, q: &str, page: Page) -> Result<Vec<Keyword>, sqlx::Error>;
    async fn trending_keywords(&self, limit: i64) -> Result<Vec<Keyword>, sqlx::Error>;
    async fn keyword_stats(&self) -> Result<KeywordStats, sqlx::Error>;
    async fn topics_for_keyword(
        &self,
        keyword_id: i64,
        page: Page,
    ) -> Result<Vec<TopicSummary>, sqlx::Error>;
    /// Links a keyword to a topic. Returns false when the pair already exists
    /// (the unique constraint absorbs the race two concurrent writers would
    /// otherwise hit). On success the keyword's topics_count is recomputed in
    /// the same transaction.
    async fn link_keyword_topic(&self, keyword_id: i64, topic_id: i64)
    -> Result<bool, sqlx::Error>;
    /// Unlinks a pair; false when it did not exist. Recomputes topics_count
    /// transactionally on success.
    async fn unlink_keyword_topic(
        &self,
        keyword_id: i64,
        topic_id: i64,
    ) -> Result<bool, sqlx::Error>;

    // --- Dashboard & administration ---
    async fn dashboard_stats(&self) -> Result<DashboardStats, sqlx::Error>;
    /// Idempotently creates the four canonical roles and the bootstrap
    /// super-admin account, all in one transaction.
    async fn seed_defaults(&self, admin_password_hash: &str) -> Result<(), sqlx::Error>;
    /// Wipes every entity table in dependency order, one transaction.
    async fn clear_all(&self) -> Result<(), sqlx::Error>;
}

/// The concrete type shared through the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// Production implementation of `Repository` over a pooled Postgres
/// connection. All queries are runtime-checked (`query_as` / `QueryBuilder`)
/// with bound parameters throughout.
pub struct PostgresRepository {
    pool: PgPool,
}

const USER_COLS: &str =
    "u.id, u.username, u.email, u.role_id, r.name AS role, u.created_at, u.updated_at";
const TOPIC_COLS: &str = "id, title, popularity, ai_tips, quick_actions, created_at, updated_at";
const DETAILS_COLS: &str = "id, search_topic_id, popularity_value, time_range, region, \
     suggested_title, suggested_hashtags, suggested_script, created_at, updated_at";
const SCENE_COLS: &str = "id, detail_id, scene_number, visual_description, voice_over, created_at";
const VIDEO_COLS: &str = "id, detail_id, title, creator, views, hashtags, video_url, created_at";
const EXPLORE_COLS: &str = "id, title, popularity, ai_tip, created_at, updated_at";
const KEYWORD_COLS: &str =
    "id, name, description, popularity, is_trending, topics_count, created_at, updated_at";

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users & roles ---

    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        self.fetch_user(id).await
    }

    async fn get_user_record(&self, identifier: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT u.id, u.username, u.email, u.password_hash, u.role_id, r.name AS role, \
             u.created_at, u.updated_at \
             FROM users u JOIN roles r ON u.role_id = r.id \
             WHERE u.username = $1 OR u.email = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users u JOIN roles r ON u.role_id = r.id \
             ORDER BY u.id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_user(&self, new: NewUser) -> Result<User, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role_id)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_user(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_user(&self, id: i64, upd: UserUpdate) -> Result<Option<User>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = now()");
        if let Some(v) = upd.username {
            qb.push(", username = ").push_bind(v);
        }
        if let Some(v) = upd.email {
            qb.push(", email = ").push_bind(v);
        }
        if let Some(v) = upd.role_id {
            qb.push(", role_id = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING id");

        let updated: Option<i64> = qb.build_query_scalar().fetch_optional(&self.pool).await?;
        match updated {
            Some(user_id) => self.fetch_user(user_id).await,
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_roles(&self) -> Result<Vec<RoleRow>, sqlx::Error> {
        sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<RoleRow>, sqlx::Error> {
        sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_role(&self, name: &str) -> Result<RoleRow, sqlx::Error> {
        sqlx::query_as::<_, RoleRow>("INSERT INTO roles (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    // --- Search topics ---

    async fn list_search_topics(
        &self,
        page: Page,
        sort: TopicSort,
    ) -> Result<Vec<SearchTopic>, sqlx::Error> {
        sqlx::query_as::<_, SearchTopic>(&format!(
            "SELECT {TOPIC_COLS} FROM search_topics ORDER BY {} LIMIT $1 OFFSET $2",
            sort.order_clause()
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_search_topic(&self, id: i64) -> Result<Option<SearchTopic>, sqlx::Error> {
        sqlx::query_as::<_, SearchTopic>(&format!(
            "SELECT {TOPIC_COLS} FROM search_topics WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_search_topic(
        &self,
        new: SearchTopicCreate,
    ) -> Result<SearchTopic, sqlx::Error> {
        sqlx::query_as::<_, SearchTopic>(&format!(
            "INSERT INTO search_topics (title, popularity, ai_tips, quick_actions) \
             VALUES ($1, $2, $3, $4) RETURNING {TOPIC_COLS}"
        ))
        .bind(&new.title)
        .bind(new.popularity)
        .bind(&new.ai_tips)
        .bind(&new.quick_actions)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_search_topic(
        &self,
        id: i64,
        upd: SearchTopicUpdate,
    ) -> Result<Option<SearchTopic>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE search_topics SET updated_at = now()");
        if let Some(v) = upd.title {
            qb.push(", title = ").push_bind(v);
        }
        if let Some(v) = upd.popularity {
            qb.push(", popularity = ").push_bind(v);
        }
        if let Some(v) = upd.ai_tips {
            // Inner None binds SQL NULL: an explicit null clears the column.
            qb.push(", ai_tips = ").push_bind(v);
        }
        if let Some(v) = upd.quick_actions {
            qb.push(", quick_actions = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(&format!(" RETURNING {TOPIC_COLS}"));

        qb.build_query_as::<SearchTopic>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_search_topic(&self, id: i64) -> Result<bool, sqlx::Error> {
        // Children (details, scenes, videos, keyword links) fall with the
        // topic via ON DELETE CASCADE. The cascade removes join rows behind
        // the counters' back, so the affected keywords' topics_count is
        // recomputed in the same transaction.
        let mut tx = self.pool.begin().await?;
        let affected: Vec<i64> = sqlx::query_scalar(
            "SELECT keyword_id FROM search_topic_keywords WHERE search_topic_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM search_topics WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted {
            for keyword_id in affected {
                sqlx::query(
                    "UPDATE keywords SET topics_count = \
                     (SELECT COUNT(*) FROM search_topic_keywords WHERE keyword_id = $1), \
                     updated_at = now() WHERE id = $1",
                )
                .bind(keyword_id)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn search_search_topics(
        &self,
        q: &str,
        page: Page,
    ) -> Result<Vec<SearchTopic>, sqlx::Error> {
        let pattern = format!("%{q}%");
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {TOPIC_COLS} FROM search_topics WHERE (title ILIKE "
        ));
        qb.push_bind(pattern.clone());
        qb.push(" OR ai_tips ILIKE ").push_bind(pattern.clone());
        qb.push(" OR quick_actions ILIKE ").push_bind(pattern);
        qb.push(") ORDER BY id ASC LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.skip);

        qb.build_query_as::<SearchTopic>().fetch_all(&self.pool).await
    }

    // --- Search details ---

    async fn get_details_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Option<SearchDetails>, sqlx::Error> {
        sqlx::query_as::<_, SearchDetails>(&format!(
            "SELECT {DETAILS_COLS} FROM search_details WHERE search_topic_id = $1"
        ))
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_details(&self, id: i64) -> Result<Option<SearchDetails>, sqlx::Error> {
        sqlx::query_as::<_, SearchDetails>(&format!(
            "SELECT {DETAILS_COLS} FROM search_details WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_details(
        &self,
        topic_id: i64,
        new: SearchDetailsCreate,
    ) -> Result<SearchDetails, sqlx::Error> {
        sqlx::query_as::<_, SearchDetails>(&format!(
            "INSERT INTO search_details \
             (search_topic_id, popularity_value, time_range, region, \
              suggested_title, suggested_hashtags, suggested_script) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {DETAILS_COLS}"
        ))
        .bind(topic_id)
        .bind(new.popularity_value)
        .bind(&new.time_range)
        .bind(&new.region)
        .bind(&new.suggested_title)
        .bind(&new.suggested_hashtags)
        .bind(&new.suggested_script)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_details(
        &self,
        id: i64,
        upd: SearchDetailsUpdate,
    ) -> Result<Option<SearchDetails>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE search_details SET updated_at = now()");
        if let Some(v) = upd.popularity_value {
            qb.push(", popularity_value = ").push_bind(v);
        }
        if let Some(v) = upd.time_range {
            qb.push(", time_range = ").push_bind(v);
        }
        if let Some(v) = upd.region {
            qb.push(", region = ").push_bind(v);
        }
        if let Some(v) = upd.suggested_title {
            qb.push(", suggested_title = ").push_bind(v);
        }
        if let Some(v) = upd.suggested_hashtags {
            qb.push(", suggested_hashtags = ").push_bind(v);
        }
        if let Some(v) = upd.suggested_script {
            qb.push(", suggested_script = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(&format!(" RETURNING {DETAILS_COLS}"));

        qb.build_query_as::<SearchDetails>()
            .fetch_optional(&self.pool)
            .await
    }

    // --- Script scenes ---

    async fn list_scenes(&self, detail_id: i64) -> Result<Vec<ScriptScene>, sqlx::Error> {
        sqlx::query_as::<_, ScriptScene>(&format!(
            "SELECT {SCENE_COLS} FROM script_scenes WHERE detail_id = $1 ORDER BY scene_number ASC"
        ))
        .bind(detail_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_scene(
        &self,
        detail_id: i64,
        new: ScriptSceneCreate,
    ) -> Result<ScriptScene, sqlx::Error> {
        sqlx::query_as::<_, ScriptScene>(&format!(
            "INSERT INTO script_scenes (detail_id, scene_number, visual_description, voice_over) \
             VALUES ($1, $2, $3, $4) RETURNING {SCENE_COLS}"
        ))
        .bind(detail_id)
        .bind(new.scene_number)
        .bind(&new.visual_description)
        .bind(&new.voice_over)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_scene(
        &self,
        id: i64,
        upd: ScriptSceneUpdate,
    ) -> Result<Option<ScriptScene>, sqlx::Error> {
        // No updated_at column on scenes; the self-assignment anchors the SET
        // list so an empty partial payload still round-trips the row.
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE script_scenes SET id = id");
        if let Some(v) = upd.scene_number {
            qb.push(", scene_number = ").push_bind(v);
        }
        if let Some(v) = upd.visual_description {
            qb.push(", visual_description = ").push_bind(v);
        }
        if let Some(v) = upd.voice_over {
            qb.push(", voice_over = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(&format!(" RETURNING {SCENE_COLS}"));

        qb.build_query_as::<ScriptScene>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_scene(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM script_scenes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Related videos ---

    async fn list_videos(&self, detail_id: i64) -> Result<Vec<RelatedVideo>, sqlx::Error> {
        sqlx::query_as::<_, RelatedVideo>(&format!(
            "SELECT {VIDEO_COLS} FROM related_videos WHERE detail_id = $1 ORDER BY views DESC"
        ))
        .bind(detail_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_video(
        &self,
        detail_id: i64,
        new: RelatedVideoCreate,
    ) -> Result<RelatedVideo, sqlx::Error> {
        sqlx::query_as::<_, RelatedVideo>(&format!(
            "INSERT INTO related_videos (detail_id, title, creator, views, hashtags, video_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {VIDEO_COLS}"
        ))
        .bind(detail_id)
        .bind(&new.title)
        .bind(&new.creator)
        .bind(new.views)
        .bind(&new.hashtags)
        .bind(&new.video_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_video(
        &self,
        id: i64,
        upd: RelatedVideoUpdate,
    ) -> Result<Option<RelatedVideo>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE related_videos SET id = id");
        if let Some(v) = upd.title {
            qb.push(", title = ").push_bind(v);
        }
        if let Some(v) = upd.creator {
            qb.push(", creator = ").push_bind(v);
        }
        if let Some(v) = upd.views {
            qb.push(", views = ").push_bind(v);
        }
        if let Some(v) = upd.hashtags {
            qb.push(", hashtags = ").push_bind(v);
        }
        if let Some(v) = upd.video_url {
            qb.push(", video_url = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(&format!(" RETURNING {VIDEO_COLS}"));

        qb.build_query_as::<RelatedVideo>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_video(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM related_videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Explore topics ---

    async fn list_explore_topics(
        &self,
        page: Page,
        sort: TopicSort,
    ) -> Result<Vec<ExploreTopic>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTopic>(&format!(
            "SELECT {EXPLORE_COLS} FROM explore_topics ORDER BY {} LIMIT $1 OFFSET $2",
            sort.order_clause()
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_explore_topic(&self, id: i64) -> Result<Option<ExploreTopic>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTopic>(&format!(
            "SELECT {EXPLORE_COLS} FROM explore_topics WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_explore_topic(
        &self,
        new: ExploreTopicCreate,
    ) -> Result<ExploreTopic, sqlx::Error> {
        sqlx::query_as::<_, ExploreTopic>(&format!(
            "INSERT INTO explore_topics (title, popularity, ai_tip) \
             VALUES ($1, $2, $3) RETURNING {EXPLORE_COLS}"
        ))
        .bind(&new.title)
        .bind(new.popularity)
        .bind(&new.ai_tip)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_explore_topic(
        &self,
        id: i64,
        upd: ExploreTopicUpdate,
    ) -> Result<Option<ExploreTopic>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE explore_topics SET updated_at = now()");
        if let Some(v) = upd.title {
            qb.push(", title = ").push_bind(v);
        }
        if let Some(v) = upd.popularity {
            qb.push(", popularity = ").push_bind(v);
        }
        if let Some(v) = upd.ai_tip {
            qb.push(", ai_tip = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(&format!(" RETURNING {EXPLORE_COLS}"));

        qb.build_query_as::<ExploreTopic>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_explore_topic(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM explore_topics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_explore_topics(
        &self,
        q: &str,
        page: Page,
    ) -> Result<Vec<ExploreTopic>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTopic>(&format!(
            "SELECT {EXPLORE_COLS} FROM explore_topics WHERE title ILIKE $1 \
             ORDER BY id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(format!("%{q}%"))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
    }

    async fn trending_explore_topics(&self, limit: i64) -> Result<Vec<ExploreTopic>, sqlx::Error> {
        sqlx::query_as::<_, ExploreTopic>(&format!(
            "SELECT {EXPLORE_COLS} FROM explore_topics ORDER BY popularity DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn import_explore_topics(
        &self,
        rows: Vec<ExploreTopicCreate>,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut imported = 0u64;
        for row in rows {
            sqlx::query("INSERT INTO explore_topics (title, popularity, ai_tip) VALUES ($1, $2, $3)")
                .bind(&row.title)
                .bind(row.popularity)
                .bind(&row.ai_tip)
                .execute(&mut *tx)
                .await?;
            imported += 1;
        }
        tx.commit().await?;
        Ok(imported)
    }

    // --- Keywords ---

    async fn list_keywords(
        &self,
        page: Page,
        sort: KeywordSort,
    ) -> Result<Vec<Keyword>, sqlx::Error> {
        sqlx::query_as::<_, Keyword>(&format!(
            "SELECT {KEYWORD_COLS} FROM keywords ORDER BY {} LIMIT $1 OFFSET $2",
            sort.order_clause()
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_keyword(&self, id: i64) -> Result<Option<Keyword>, sqlx::Error> {
        sqlx::query_as::<_, Keyword>(&format!(
            "SELECT {KEYWORD_COLS} FROM keywords WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_keyword_by_name(&self, name: &str) -> Result<Option<Keyword>, sqlx::Error> {
        sqlx::query_as::<_, Keyword>(&format!(
            "SELECT {KEYWORD_COLS} FROM keywords WHERE lower(name) = lower($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_keyword(&self, new: KeywordCreate) -> Result<Keyword, sqlx::Error> {
        sqlx::query_as::<_, Keyword>(&format!(
            "INSERT INTO keywords (name, description, popularity, is_trending) \
             VALUES ($1, $2, $3, $4) RETURNING {KEYWORD_COLS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.popularity)
        .bind(new.is_trending)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_keyword(
        &self,
        id: i64,
        upd: KeywordUpdate,
    ) -> Result<Option<Keyword>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE keywords SET updated_at = now()");
        if let Some(v) = upd.name {
            qb.push(", name = ").push_bind(v);
        }
        if let Some(v) = upd.description {
            qb.push(", description = ").push_bind(v);
        }
        if let Some(v) = upd.popularity {
            qb.push(", popularity = ").push_bind(v);
        }
        if let Some(v) = upd.is_trending {
            qb.push(", is_trending = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(&format!(" RETURNING {KEYWORD_COLS}"));

        qb.build_query_as::<Keyword>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_keyword(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM keywords WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_keywords(&self, q: &str, page: Page) -> Result<Vec<Keyword>, sqlx::Error> {
        let pattern = format!("%{q}%");
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {KEYWORD_COLS} FROM keywords WHERE (name ILIKE "));
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ").push_bind(pattern);
        qb.push(") ORDER BY id ASC LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.skip);

        qb.build_query_as::<Keyword>().fetch_all(&self.pool).await
    }

    async fn trending_keywords(&self, limit: i64) -> Result<Vec<Keyword>, sqlx::Error> {
        sqlx::query_as::<_, Keyword>(&format!(
            "SELECT {KEYWORD_COLS} FROM keywords WHERE is_trending = TRUE \
             ORDER BY popularity DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn keyword_stats(&self) -> Result<KeywordStats, sqlx::Error> {
        let total_keywords: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM keywords")
            .fetch_one(&self.pool)
            .await?;
        let trending_keywords: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM keywords WHERE is_trending = TRUE")
                .fetch_one(&self.pool)
                .await?;
        let total_relationships: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM search_topic_keywords")
                .fetch_one(&self.pool)
                .await?;
        let avg_popularity: f64 =
            sqlx::query_scalar("SELECT COALESCE(AVG(popularity), 0) FROM keywords")
                .fetch_one(&self.pool)
                .await?;
        Ok(KeywordStats {
            total_keywords,
            trending_keywords,
            total_relationships,
            avg_popularity,
        })
    }

    async fn topics_for_keyword(
        &self,
        keyword_id: i64,
        page: Page,
    ) -> Result<Vec<TopicSummary>, sqlx::Error> {
        sqlx::query_as::<_, TopicSummary>(
            "SELECT t.id, t.title, t.popularity, t.created_at \
             FROM search_topics t \
             JOIN search_topic_keywords stk ON t.id = stk.search_topic_id \
             WHERE stk.keyword_id = $1 ORDER BY t.id ASC LIMIT $2 OFFSET $3",
        )
        .bind(keyword_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
    }

    async fn link_keyword_topic(
        &self,
        keyword_id: i64,
        topic_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO search_topic_keywords (search_topic_id, keyword_id) VALUES ($1, $2) \
             ON CONFLICT (search_topic_id, keyword_id) DO NOTHING",
        )
        .bind(topic_id)
        .bind(keyword_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query(
                "UPDATE keywords SET topics_count = \
                 (SELECT COUNT(*) FROM search_topic_keywords WHERE keyword_id = $1), \
                 updated_at = now() WHERE id = $1",
            )
            .bind(keyword_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn unlink_keyword_topic(
        &self,
        keyword_id: i64,
        topic_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query(
            "DELETE FROM search_topic_keywords WHERE search_topic_id = $1 AND keyword_id = $2",
        )
        .bind(topic_id)
        .bind(keyword_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if removed {
            sqlx::query(
                "UPDATE keywords SET topics_count = \
                 (SELECT COUNT(*) FROM search_topic_keywords WHERE keyword_id = $1), \
                 updated_at = now() WHERE id = $1",
            )
            .bind(keyword_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(removed)
    }

    // --- Dashboard & administration ---

    async fn dashboard_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_search_topics: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_topics")
            .fetch_one(&self.pool)
            .await?;
        let total_explore_topics: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM explore_topics")
            .fetch_one(&self.pool)
            .await?;
        let total_videos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM related_videos")
            .fetch_one(&self.pool)
            .await?;
        Ok(DashboardStats {
            total_users,
            total_search_topics,
            total_explore_topics,
            total_videos,
            recent_activity: vec![],
        })
    }

    async fn seed_defaults(&self, admin_password_hash: &str) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for role in Role::ALL {
            sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }
        let super_admin_id: i64 = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(Role::SuperAdmin.as_str())
            .fetch_one(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, role_id) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (username) DO NOTHING",
        )
        .bind("superadmin")
        .bind("superadmin@trendportal.local")
        .bind(admin_password_hash)
        .bind(super_admin_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        // Reverse dependency order.
        for table in [
            "related_videos",
            "script_scenes",
            "search_details",
            "search_topic_keywords",
            "keywords",
            "search_topics",
            "explore_topics",
            "users",
            "roles",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
