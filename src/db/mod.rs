use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::messages;

pub mod migrator;
pub mod repositories;

pub use repositories::like::ToggleOutcome;
pub use repositories::user::{NewUserRecord, ProfileUpdateRecord, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn message_repo(&self) -> repositories::message::MessageRepository {
        repositories::message::MessageRepository::new(self.conn.clone())
    }

    fn like_repo(&self) -> repositories::like::LikeRepository {
        repositories::like::LikeRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn create_user(&self, record: NewUserRecord) -> Result<crate::entities::users::Model> {
        self.user_repo().insert(record).await
    }

    pub async fn get_user(&self, user_id: i32) -> Result<Option<User>> {
        self.user_repo().get(user_id).await
    }

    pub async fn get_user_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_username_with_hash(username).await
    }

    pub async fn get_user_with_hash(&self, user_id: i32) -> Result<Option<(User, String)>> {
        self.user_repo().get_with_hash(user_id).await
    }

    pub async fn get_users_by_ids(&self, user_ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_many(user_ids).await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.user_repo().search(query).await
    }

    pub async fn update_user_profile(
        &self,
        user_id: i32,
        record: ProfileUpdateRecord,
    ) -> Result<Option<crate::entities::users::Model>> {
        self.user_repo().update_profile(user_id, record).await
    }

    pub async fn delete_user_cascading(&self, user_id: i32) -> Result<bool> {
        self.user_repo().delete_cascading(user_id).await
    }

    // ========== Follow Repository Methods ==========

    pub async fn add_follow(&self, follower_id: i32, followed_id: i32) -> Result<()> {
        self.follow_repo().add(follower_id, followed_id).await
    }

    pub async fn remove_follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().remove(follower_id, followed_id).await
    }

    pub async fn follow_exists(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().exists(follower_id, followed_id).await
    }

    pub async fn following_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.follow_repo().following_ids(user_id).await
    }

    pub async fn follower_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.follow_repo().follower_ids(user_id).await
    }

    pub async fn count_following(&self, user_id: i32) -> Result<u64> {
        self.follow_repo().count_following(user_id).await
    }

    pub async fn count_followers(&self, user_id: i32) -> Result<u64> {
        self.follow_repo().count_followers(user_id).await
    }

    // ========== Message Repository Methods ==========

    pub async fn create_message(&self, user_id: i32, text: String) -> Result<messages::Model> {
        self.message_repo().insert(user_id, text).await
    }

    pub async fn get_message(&self, message_id: i32) -> Result<Option<messages::Model>> {
        self.message_repo().get(message_id).await
    }

    pub async fn get_messages_by_ids(&self, message_ids: &[i32]) -> Result<Vec<messages::Model>> {
        self.message_repo().get_many(message_ids).await
    }

    pub async fn delete_message(&self, message_id: i32) -> Result<bool> {
        self.message_repo().delete(message_id).await
    }

    pub async fn messages_for_author(&self, user_id: i32) -> Result<Vec<messages::Model>> {
        self.message_repo().for_author(user_id).await
    }

    pub async fn latest_messages_for_authors(
        &self,
        author_ids: &[i32],
        limit: u64,
    ) -> Result<Vec<messages::Model>> {
        self.message_repo()
            .latest_for_authors(author_ids, limit)
            .await
    }

    pub async fn count_messages_for_author(&self, user_id: i32) -> Result<u64> {
        self.message_repo().count_for_author(user_id).await
    }

    // ========== Like Repository Methods ==========

    pub async fn toggle_like(&self, user_id: i32, message_id: i32) -> Result<ToggleOutcome> {
        self.like_repo().toggle(user_id, message_id).await
    }

    pub async fn liked_message_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.like_repo().liked_message_ids(user_id).await
    }

    pub async fn liked_ids_among(&self, user_id: i32, message_ids: &[i32]) -> Result<Vec<i32>> {
        self.like_repo().liked_ids_among(user_id, message_ids).await
    }

    pub async fn like_counts_for_messages(
        &self,
        message_ids: &[i32],
    ) -> Result<HashMap<i32, i64>> {
        self.like_repo().counts_for_messages(message_ids).await
    }

    pub async fn count_likes_for_user(&self, user_id: i32) -> Result<u64> {
        self.like_repo().count_for_user(user_id).await
    }
}
