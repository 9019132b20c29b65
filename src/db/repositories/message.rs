use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{likes, messages};

pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a message for the given author, stamped with the current time.
    pub async fn insert(&self, user_id: i32, text: String) -> Result<messages::Model> {
        let active = messages::ActiveModel {
            text: Set(text),
            created_at: Set(Utc::now().to_rfc3339()),
            user_id: Set(user_id),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert message")?;

        Ok(model)
    }

    pub async fn get(&self, message_id: i32) -> Result<Option<messages::Model>> {
        let message = messages::Entity::find_by_id(message_id)
            .one(&self.conn)
            .await
            .context("Failed to fetch message")?;

        Ok(message)
    }

    pub async fn get_many(&self, message_ids: &[i32]) -> Result<Vec<messages::Model>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = messages::Entity::find()
            .filter(messages::Column::Id.is_in(message_ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to fetch messages")?;

        Ok(rows)
    }

    /// Delete a message and its likes. Returns whether the message existed.
    pub async fn delete(&self, message_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        likes::Entity::delete_many()
            .filter(likes::Column::MessageId.eq(message_id))
            .exec(&txn)
            .await?;

        let result = messages::Entity::delete_by_id(message_id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    /// All of one author's messages, newest first.
    pub async fn for_author(&self, user_id: i32) -> Result<Vec<messages::Model>> {
        let rows = messages::Entity::find()
            .filter(messages::Column::UserId.eq(user_id))
            .order_by_desc(messages::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list messages")?;

        Ok(rows)
    }

    /// The newest messages across a set of authors, newest first, capped
    /// at `limit`.
    pub async fn latest_for_authors(
        &self,
        author_ids: &[i32],
        limit: u64,
    ) -> Result<Vec<messages::Model>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = messages::Entity::find()
            .filter(messages::Column::UserId.is_in(author_ids.to_vec()))
            .order_by_desc(messages::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to fetch message window")?;

        Ok(rows)
    }

    pub async fn count_for_author(&self, user_id: i32) -> Result<u64> {
        let count = messages::Entity::find()
            .filter(messages::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count messages")?;

        Ok(count)
    }
}
