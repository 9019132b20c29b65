use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{follows, likes, messages, users};

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            image_url: model.image_url,
            header_image_url: model.header_image_url,
            bio: model.bio,
            location: model.location,
            is_admin: model.is_admin,
            created_at: model.created_at,
        }
    }
}

/// Column values for a new user row. The hash must already be computed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_admin: bool,
}

/// Replacement values for an existing user's editable columns.
#[derive(Debug, Clone)]
pub struct ProfileUpdateRecord {
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user row and return it.
    ///
    /// Unique violations on username or email surface as the raw
    /// [`sea_orm::DbErr`], so callers can downcast and inspect them.
    pub async fn insert(&self, record: NewUserRecord) -> Result<users::Model> {
        let active = users::ActiveModel {
            username: Set(record.username),
            email: Set(record.email),
            password_hash: Set(record.password_hash),
            image_url: Set(record.image_url),
            header_image_url: Set(record.header_image_url),
            bio: Set(record.bio),
            location: Set(record.location),
            is_admin: Set(record.is_admin),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(model)
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to fetch user")?;

        Ok(user.map(User::from))
    }

    /// Fetch a user together with the stored password hash, for verification.
    pub async fn get_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to fetch user by username")?;

        Ok(user.map(|model| {
            let hash = model.password_hash.clone();
            (User::from(model), hash)
        }))
    }

    pub async fn get_with_hash(&self, user_id: i32) -> Result<Option<(User, String)>> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to fetch user")?;

        Ok(user.map(|model| {
            let hash = model.password_hash.clone();
            (User::from(model), hash)
        }))
    }

    pub async fn get_many(&self, user_ids: &[i32]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to fetch users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Case-insensitive substring search on username. Empty query lists
    /// every user.
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        let mut select = users::Entity::find();

        if !query.is_empty() {
            select = select.filter(users::Column::Username.contains(query));
        }

        let rows = select
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to search users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Overwrite the editable profile columns and return the updated row.
    ///
    /// Unique violations surface as the raw [`sea_orm::DbErr`], like
    /// [`Self::insert`].
    pub async fn update_profile(
        &self,
        user_id: i32,
        record: ProfileUpdateRecord,
    ) -> Result<Option<users::Model>> {
        let Some(existing) = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to fetch user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = existing.into();
        active.username = Set(record.username);
        active.email = Set(record.email);
        active.image_url = Set(record.image_url);
        active.header_image_url = Set(record.header_image_url);
        active.bio = Set(record.bio);
        active.location = Set(record.location);

        let model = active.update(&self.conn).await?;
        Ok(Some(model))
    }

    /// Delete a user and everything hanging off it: their messages, likes
    /// in both directions, and follow edges on either side.
    pub async fn delete_cascading(&self, user_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        likes::Entity::delete_many()
            .filter(likes::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let message_ids: Vec<i32> = messages::Entity::find()
            .filter(messages::Column::UserId.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|message| message.id)
            .collect();

        if !message_ids.is_empty() {
            likes::Entity::delete_many()
                .filter(likes::Column::MessageId.is_in(message_ids))
                .exec(&txn)
                .await?;
        }

        messages::Entity::delete_many()
            .filter(messages::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        follows::Entity::delete_many()
            .filter(
                follows::Column::FollowerId
                    .eq(user_id)
                    .or(follows::Column::FollowedId.eq(user_id)),
            )
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}
