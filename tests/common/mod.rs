#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use trend_portal::{
    AppState,
    auth::{self, AuthUser},
    config::AppConfig,
    models::{
        DashboardStats, ExploreTopic, ExploreTopicCreate, ExploreTopicUpdate, Keyword,
        KeywordCreate, KeywordStats, KeywordUpdate, NewUser, RelatedVideo, RelatedVideoCreate,
        RelatedVideoUpdate, RoleRow, ScriptScene, ScriptSceneCreate, ScriptSceneUpdate,
        SearchDetails, SearchDetailsCreate, SearchDetailsUpdate, SearchTopic, SearchTopicCreate,
        SearchTopicUpdate, TopicSummary, User, UserRecord, UserUpdate,
    },
    repository::{KeywordSort, Page, Repository, TopicSort},
    roles::Role,
};

// --- In-memory Repository ---

// A behavioral fake rather than a per-test stub: it honors ordering,
// cascades, case-insensitive name lookups and the link-count recomputation,
// so handler tests exercise the same contract the Postgres implementation
// provides.

#[derive(Default)]
struct Inner {
    next_id: i64,
    roles: Vec<RoleRow>,
    users: Vec<UserRecord>,
    topics: Vec<SearchTopic>,
    details: Vec<SearchDetails>,
    scenes: Vec<ScriptScene>,
    videos: Vec<RelatedVideo>,
    explore: Vec<ExploreTopic>,
    keywords: Vec<Keyword>,
    /// (search_topic_id, keyword_id)
    links: Vec<(i64, i64)>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn role_name(&self, role_id: i64) -> String {
        self.roles
            .iter()
            .find(|r| r.id == role_id)
            .map(|r| r.name.clone())
            .unwrap_or_default()
    }

    fn public_user(&self, record: &UserRecord) -> User {
        User {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            role_id: record.role_id,
            role: self.role_name(record.role_id),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn recompute_topics_count(&mut self, keyword_id: i64) {
        let count = self.links.iter().filter(|(_, k)| *k == keyword_id).count() as i64;
        if let Some(kw) = self.keywords.iter_mut().find(|k| k.id == keyword_id) {
            kw.topics_count = count;
            kw.updated_at = Some(Utc::now());
        }
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh repository with the four canonical roles already present.
    pub fn with_roles() -> Self {
        let repo = Self::new();
        {
            let mut inner = repo.inner.lock().unwrap();
            for role in Role::ALL {
                let id = inner.next_id();
                inner.roles.push(RoleRow {
                    id,
                    name: role.as_str().to_string(),
                });
            }
        }
        repo
    }

    /// Inserts a user with a real argon2 hash so login tests can verify it.
    pub fn add_user_with_password(&self, username: &str, password: &str, role: Role) -> User {
        let hash = auth::hash_password(password).unwrap();
        self.add_user_with_hash(username, &hash, role)
    }

    /// Inserts a user with a placeholder hash, for tests that never log in.
    pub fn add_user(&self, username: &str, role: Role) -> User {
        self.add_user_with_hash(username, "x", role)
    }

    fn add_user_with_hash(&self, username: &str, hash: &str, role: Role) -> User {
        let mut inner = self.inner.lock().unwrap();
        let role_id = inner
            .roles
            .iter()
            .find(|r| r.name == role.as_str())
            .map(|r| r.id)
            .expect("role must be seeded");
        let id = inner.next_id();
        let record = UserRecord {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash.to_string(),
            role_id,
            role: role.as_str().to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let user = inner.public_user(&record);
        inner.users.push(record);
        user
    }
}

fn paginate<T: Clone>(rows: Vec<T>, page: Page) -> Vec<T> {
    rows.into_iter()
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| inner.public_user(u)))
    }

    async fn get_user_record(&self, identifier: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .map(|u| {
                let mut record = u.clone();
                record.role = inner.role_name(u.role_id);
                record
            }))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| inner.public_user(u)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| inner.public_user(u)))
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner.users.iter().map(|u| inner.public_user(u)).collect();
        users.sort_by_key(|u| u.id);
        Ok(paginate(users, page))
    }

    async fn create_user(&self, new: NewUser) -> Result<User, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let record = UserRecord {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role_id: new.role_id,
            role: inner.role_name(new.role_id),
            created_at: Utc::now(),
            updated_at: None,
        };
        let user = inner.public_user(&record);
        inner.users.push(record);
        Ok(user)
    }

    async fn update_user(&self, id: i64, upd: UserUpdate) -> Result<Option<User>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(pos) = inner.users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        {
            let record = &mut inner.users[pos];
            if let Some(v) = upd.username {
                record.username = v;
            }
            if let Some(v) = upd.email {
                record.email = v;
            }
            if let Some(v) = upd.role_id {
                record.role_id = v;
            }
            record.updated_at = Some(Utc::now());
        }
        let record = inner.users[pos].clone();
        Ok(Some(inner.public_user(&record)))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }

    async fn list_roles(&self) -> Result<Vec<RoleRow>, sqlx::Error> {
        Ok(self.inner.lock().unwrap().roles.clone())
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<RoleRow>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn create_role(&self, name: &str) -> Result<RoleRow, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = RoleRow {
            id,
            name: name.to_string(),
        };
        inner.roles.push(row.clone());
        Ok(row)
    }

    // --- Search topics ---

    async fn list_search_topics(
        &self,
        page: Page,
        sort: TopicSort,
    ) -> Result<Vec<SearchTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.topics.clone();
        match sort {
            TopicSort::Popularity => {
                rows.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap())
            }
            TopicSort::Title => rows.sort_by(|a, b| a.title.cmp(&b.title)),
            TopicSort::CreatedAt => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            TopicSort::Insertion => rows.sort_by_key(|t| t.id),
        }
        Ok(paginate(rows, page))
    }

    async fn get_search_topic(&self, id: i64) -> Result<Option<SearchTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.topics.iter().find(|t| t.id == id).cloned())
    }

    async fn create_search_topic(
        &self,
        new: SearchTopicCreate,
    ) -> Result<SearchTopic, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let topic = SearchTopic {
            id,
            title: new.title,
            popularity: new.popularity,
            ai_tips: new.ai_tips,
            quick_actions: new.quick_actions,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.topics.push(topic.clone());
        Ok(topic)
    }

    async fn update_search_topic(
        &self,
        id: i64,
        upd: SearchTopicUpdate,
    ) -> Result<Option<SearchTopic>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(topic) = inner.topics.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(v) = upd.title {
            topic.title = v;
        }
        if let Some(v) = upd.popularity {
            topic.popularity = v;
        }
        if let Some(v) = upd.ai_tips {
            topic.ai_tips = v;
        }
        if let Some(v) = upd.quick_actions {
            topic.quick_actions = v;
        }
        topic.updated_at = Some(Utc::now());
        Ok(Some(topic.clone()))
    }

    async fn delete_search_topic(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.topics.len();
        inner.topics.retain(|t| t.id != id);
        if inner.topics.len() == before {
            return Ok(false);
        }
        // Cascade: details and their children, then keyword links.
        let detail_ids: Vec<i64> = inner
            .details
            .iter()
            .filter(|d| d.search_topic_id == id)
            .map(|d| d.id)
            .collect();
        inner.details.retain(|d| d.search_topic_id != id);
        inner.scenes.retain(|s| !detail_ids.contains(&s.detail_id));
        inner.videos.retain(|v| !detail_ids.contains(&v.detail_id));
        let affected: Vec<i64> = inner
            .links
            .iter()
            .filter(|(t, _)| *t == id)
            .map(|(_, k)| *k)
            .collect();
        inner.links.retain(|(t, _)| *t != id);
        for keyword_id in affected {
            inner.recompute_topics_count(keyword_id);
        }
        Ok(true)
    }

    async fn search_search_topics(
        &self,
        q: &str,
        page: Page,
    ) -> Result<Vec<SearchTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<SearchTopic> = inner
            .topics
            .iter()
            .filter(|t| {
                contains_ci(&t.title, q)
                    || t.ai_tips.as_deref().is_some_and(|s| contains_ci(s, q))
                    || t.quick_actions
                        .as_deref()
                        .is_some_and(|s| contains_ci(s, q))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.id);
        Ok(paginate(rows, page))
    }

    // --- Search details ---

    async fn get_details_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Option<SearchDetails>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .details
            .iter()
            .find(|d| d.search_topic_id == topic_id)
            .cloned())
    }

    async fn get_details(&self, id: i64) -> Result<Option<SearchDetails>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.details.iter().find(|d| d.id == id).cloned())
    }

    async fn create_details(
        &self,
        topic_id: i64,
        new: SearchDetailsCreate,
    ) -> Result<SearchDetails, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let details = SearchDetails {
            id,
            search_topic_id: topic_id,
            popularity_value: new.popularity_value,
            time_range: new.time_range,
            region: new.region,
            suggested_title: new.suggested_title,
            suggested_hashtags: new.suggested_hashtags,
            suggested_script: new.suggested_script,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.details.push(details.clone());
        Ok(details)
    }

    async fn update_details(
        &self,
        id: i64,
        upd: SearchDetailsUpdate,
    ) -> Result<Option<SearchDetails>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(details) = inner.details.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(v) = upd.popularity_value {
            details.popularity_value = v;
        }
        if let Some(v) = upd.time_range {
            details.time_range = v;
        }
        if let Some(v) = upd.region {
            details.region = v;
        }
        if let Some(v) = upd.suggested_title {
            details.suggested_title = v;
        }
        if let Some(v) = upd.suggested_hashtags {
            details.suggested_hashtags = v;
        }
        if let Some(v) = upd.suggested_script {
            details.suggested_script = v;
        }
        details.updated_at = Some(Utc::now());
        Ok(Some(details.clone()))
    }

    // --- Script scenes ---

    async fn list_scenes(&self, detail_id: i64) -> Result<Vec<ScriptScene>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<ScriptScene> = inner
            .scenes
            .iter()
            .filter(|s| s.detail_id == detail_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.scene_number);
        Ok(rows)
    }

    async fn create_scene(
        &self,
        detail_id: i64,
        new: ScriptSceneCreate,
    ) -> Result<ScriptScene, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let scene = ScriptScene {
            id,
            detail_id,
            scene_number: new.scene_number,
            visual_description: new.visual_description,
            voice_over: new.voice_over,
            created_at: Utc::now(),
        };
        inner.scenes.push(scene.clone());
        Ok(scene)
    }

    async fn update_scene(
        &self,
        id: i64,
        upd: ScriptSceneUpdate,
    ) -> Result<Option<ScriptScene>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(scene) = inner.scenes.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(v) = upd.scene_number {
            scene.scene_number = v;
        }
        if let Some(v) = upd.visual_description {
            scene.visual_description = v;
        }
        if let Some(v) = upd.voice_over {
            scene.voice_over = v;
        }
        Ok(Some(scene.clone()))
    }

    async fn delete_scene(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.scenes.len();
        inner.scenes.retain(|s| s.id != id);
        Ok(inner.scenes.len() < before)
    }

    // --- Related videos ---

    async fn list_videos(&self, detail_id: i64) -> Result<Vec<RelatedVideo>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<RelatedVideo> = inner
            .videos
            .iter()
            .filter(|v| v.detail_id == detail_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.views.cmp(&a.views));
        Ok(rows)
    }

    async fn create_video(
        &self,
        detail_id: i64,
        new: RelatedVideoCreate,
    ) -> Result<RelatedVideo, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let video = RelatedVideo {
            id,
            detail_id,
            title: new.title,
            creator: new.creator,
            views: new.views,
            hashtags: new.hashtags,
            video_url: new.video_url,
            created_at: Utc::now(),
        };
        inner.videos.push(video.clone());
        Ok(video)
    }

    async fn update_video(
        &self,
        id: i64,
        upd: RelatedVideoUpdate,
    ) -> Result<Option<RelatedVideo>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(video) = inner.videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        if let Some(v) = upd.title {
            video.title = v;
        }
        if let Some(v) = upd.creator {
            video.creator = v;
        }
        if let Some(v) = upd.views {
            video.views = v;
        }
        if let Some(v) = upd.hashtags {
            video.hashtags = v;
        }
        if let Some(v) = upd.video_url {
            video.video_url = v;
        }
        Ok(Some(video.clone()))
    }

    async fn delete_video(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.videos.len();
        inner.videos.retain(|v| v.id != id);
        Ok(inner.videos.len() < before)
    }

    // --- Explore topics ---

    async fn list_explore_topics(
        &self,
        page: Page,
        sort: TopicSort,
    ) -> Result<Vec<ExploreTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.explore.clone();
        match sort {
            TopicSort::Popularity => {
                rows.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap())
            }
            TopicSort::Title => rows.sort_by(|a, b| a.title.cmp(&b.title)),
            TopicSort::CreatedAt => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            TopicSort::Insertion => rows.sort_by_key(|t| t.id),
        }
        Ok(paginate(rows, page))
    }

    async fn get_explore_topic(&self, id: i64) -> Result<Option<ExploreTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.explore.iter().find(|t| t.id == id).cloned())
    }

    async fn create_explore_topic(
        &self,
        new: ExploreTopicCreate,
    ) -> Result<ExploreTopic, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let topic = ExploreTopic {
            id,
            title: new.title,
            popularity: new.popularity,
            ai_tip: new.ai_tip,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.explore.push(topic.clone());
        Ok(topic)
    }

    async fn update_explore_topic(
        &self,
        id: i64,
        upd: ExploreTopicUpdate,
    ) -> Result<Option<ExploreTopic>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(topic) = inner.explore.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(v) = upd.title {
            topic.title = v;
        }
        if let Some(v) = upd.popularity {
            topic.popularity = v;
        }
        if let Some(v) = upd.ai_tip {
            topic.ai_tip = v;
        }
        topic.updated_at = Some(Utc::now());
        Ok(Some(topic.clone()))
    }

    async fn delete_explore_topic(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.explore.len();
        inner.explore.retain(|t| t.id != id);
        Ok(inner.explore.len() < before)
    }

    async fn search_explore_topics(
        &self,
        q: &str,
        page: Page,
    ) -> Result<Vec<ExploreTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<ExploreTopic> = inner
            .explore
            .iter()
            .filter(|t| contains_ci(&t.title, q))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.id);
        Ok(paginate(rows, page))
    }

    async fn trending_explore_topics(&self, limit: i64) -> Result<Vec<ExploreTopic>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.explore.clone();
        rows.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap());
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn import_explore_topics(
        &self,
        rows: Vec<ExploreTopicCreate>,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let count = rows.len() as u64;
        for new in rows {
            let id = inner.next_id();
            inner.explore.push(ExploreTopic {
                id,
                title: new.title,
                popularity: new.popularity,
                ai_tip: new.ai_tip,
                created_at: Utc::now(),
                updated_at: None,
            });
        }
        Ok(count)
    }

    // --- Keywords ---

    async fn list_keywords(
        &self,
        page: Page,
        sort: KeywordSort,
    ) -> Result<Vec<Keyword>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.keywords.clone();
        match sort {
            KeywordSort::Popularity => {
                rows.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap())
            }
            KeywordSort::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            KeywordSort::CreatedAt => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            KeywordSort::TopicsCount => rows.sort_by(|a, b| b.topics_count.cmp(&a.topics_count)),
            KeywordSort::Insertion => rows.sort_by_key(|k| k.id),
        }
        Ok(paginate(rows, page))
    }

    async fn get_keyword(&self, id: i64) -> Result<Option<Keyword>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.keywords.iter().find(|k| k.id == id).cloned())
    }

    async fn get_keyword_by_name(&self, name: &str) -> Result<Option<Keyword>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .keywords
            .iter()
            .find(|k| k.name.to_lowercase() == name.to_lowercase())
            .cloned())
    }

    async fn create_keyword(&self, new: KeywordCreate) -> Result<Keyword, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let keyword = Keyword {
            id,
            name: new.name,
            description: new.description,
            popularity: new.popularity,
            is_trending: new.is_trending,
            topics_count: 0,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.keywords.push(keyword.clone());
        Ok(keyword)
    }

    async fn update_keyword(
        &self,
        id: i64,
        upd: KeywordUpdate,
    ) -> Result<Option<Keyword>, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(keyword) = inner.keywords.iter_mut().find(|k| k.id == id) else {
            return Ok(None);
        };
        if let Some(v) = upd.name {
            keyword.name = v;
        }
        if let Some(v) = upd.description {
            keyword.description = v;
        }
        if let Some(v) = upd.popularity {
            keyword.popularity = v;
        }
        if let Some(v) = upd.is_trending {
            keyword.is_trending = v;
        }
        keyword.updated_at = Some(Utc::now());
        Ok(Some(keyword.clone()))
    }

    async fn delete_keyword(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.keywords.len();
        inner.keywords.retain(|k| k.id != id);
        if inner.keywords.len() == before {
            return Ok(false);
        }
        inner.links.retain(|(_, k)| *k != id);
        Ok(true)
    }

    async fn search_keywords(&self, q: &str, page: Page) -> Result<Vec<Keyword>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Keyword> = inner
            .keywords
            .iter()
            .filter(|k| {
                contains_ci(&k.name, q)
                    || k.description.as_deref().is_some_and(|d| contains_ci(d, q))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|k| k.id);
        Ok(paginate(rows, page))
    }

    async fn trending_keywords(&self, limit: i64) -> Result<Vec<Keyword>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Keyword> = inner
            .keywords
            .iter()
            .filter(|k| k.is_trending)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap());
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn keyword_stats(&self) -> Result<KeywordStats, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let total = inner.keywords.len() as i64;
        let avg = if inner.keywords.is_empty() {
            0.0
        } else {
            inner.keywords.iter().map(|k| k.popularity).sum::<f64>() / total as f64
        };
        Ok(KeywordStats {
            total_keywords: total,
            trending_keywords: inner.keywords.iter().filter(|k| k.is_trending).count() as i64,
            total_relationships: inner.links.len() as i64,
            avg_popularity: avg,
        })
    }

    async fn topics_for_keyword(
        &self,
        keyword_id: i64,
        page: Page,
    ) -> Result<Vec<TopicSummary>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<TopicSummary> = inner
            .links
            .iter()
            .filter(|(_, k)| *k == keyword_id)
            .filter_map(|(t, _)| inner.topics.iter().find(|topic| topic.id == *t))
            .map(|topic| TopicSummary {
                id: topic.id,
                title: topic.title.clone(),
                popularity: topic.popularity,
                created_at: topic.created_at,
            })
            .collect();
        rows.sort_by_key(|t| t.id);
        Ok(paginate(rows, page))
    }

    async fn link_keyword_topic(
        &self,
        keyword_id: i64,
        topic_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.links.contains(&(topic_id, keyword_id)) {
            return Ok(false);
        }
        inner.links.push((topic_id, keyword_id));
        inner.recompute_topics_count(keyword_id);
        Ok(true)
    }

    async fn unlink_keyword_topic(
        &self,
        keyword_id: i64,
        topic_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.links.len();
        inner.links.retain(|pair| *pair != (topic_id, keyword_id));
        if inner.links.len() == before {
            return Ok(false);
        }
        inner.recompute_topics_count(keyword_id);
        Ok(true)
    }

    // --- Dashboard & administration ---

    async fn dashboard_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(DashboardStats {
            total_users: inner.users.len() as i64,
            total_search_topics: inner.topics.len() as i64,
            total_explore_topics: inner.explore.len() as i64,
            total_videos: inner.videos.len() as i64,
            recent_activity: vec![],
        })
    }

    async fn seed_defaults(&self, admin_password_hash: &str) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        for role in Role::ALL {
            if !inner.roles.iter().any(|r| r.name == role.as_str()) {
                let id = inner.next_id();
                inner.roles.push(RoleRow {
                    id,
                    name: role.as_str().to_string(),
                });
            }
        }
        if !inner.users.iter().any(|u| u.username == "superadmin") {
            let role_id = inner
                .roles
                .iter()
                .find(|r| r.name == Role::SuperAdmin.as_str())
                .map(|r| r.id)
                .unwrap();
            let id = inner.next_id();
            inner.users.push(UserRecord {
                id,
                username: "superadmin".to_string(),
                email: "superadmin@trendportal.local".to_string(),
                password_hash: admin_password_hash.to_string(),
                role_id,
                role: Role::SuperAdmin.as_str().to_string(),
                created_at: Utc::now(),
                updated_at: None,
            });
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::default();
        Ok(())
    }
}

// --- Shared helpers ---

pub fn app_state(repo: Arc<MemoryRepository>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

pub fn actor(user: &User) -> AuthUser {
    AuthUser {
        id: user.id,
        username: user.username.clone(),
        role: Role::parse(&user.role).unwrap(),
    }
}
