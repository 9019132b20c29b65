use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};

use crate::entities::{likes, messages};

/// What a toggle did, or why it could not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Liked,
    Unliked,
    MessageMissing,
    OwnMessage,
}

#[derive(FromQueryResult)]
struct LikeCountRow {
    message_id: i32,
    count: i64,
}

pub struct LikeRepository {
    conn: DatabaseConnection,
}

impl LikeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Flip the like edge between a user and a message.
    ///
    /// The existence check and the mutation run in one transaction, so two
    /// racing toggles resolve to one edge state rather than an error. Liking
    /// your own message is rejected.
    pub async fn toggle(&self, user_id: i32, message_id: i32) -> Result<ToggleOutcome> {
        let txn = self.conn.begin().await?;

        let Some(message) = messages::Entity::find_by_id(message_id).one(&txn).await? else {
            txn.commit().await?;
            return Ok(ToggleOutcome::MessageMissing);
        };

        if message.user_id == user_id {
            txn.commit().await?;
            return Ok(ToggleOutcome::OwnMessage);
        }

        let existing = likes::Entity::find_by_id((user_id, message_id))
            .one(&txn)
            .await?;

        let outcome = if existing.is_some() {
            likes::Entity::delete_by_id((user_id, message_id))
                .exec(&txn)
                .await?;
            ToggleOutcome::Unliked
        } else {
            likes::Entity::insert(likes::ActiveModel {
                user_id: Set(user_id),
                message_id: Set(message_id),
            })
            .on_conflict(
                OnConflict::columns([likes::Column::UserId, likes::Column::MessageId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
            ToggleOutcome::Liked
        };

        txn.commit().await.context("Failed to commit like toggle")?;

        Ok(outcome)
    }

    /// Ids of the messages a user has liked, most recent like id order is
    /// not tracked, so callers sort the hydrated messages themselves.
    pub async fn liked_message_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let edges = likes::Entity::find()
            .filter(likes::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to list liked messages")?;

        Ok(edges.into_iter().map(|edge| edge.message_id).collect())
    }

    /// Subset of `message_ids` that `user_id` has liked.
    pub async fn liked_ids_among(&self, user_id: i32, message_ids: &[i32]) -> Result<Vec<i32>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let edges = likes::Entity::find()
            .filter(likes::Column::UserId.eq(user_id))
            .filter(likes::Column::MessageId.is_in(message_ids.to_vec()))
            .all(&self.conn)
            .await
            .context("Failed to filter liked messages")?;

        Ok(edges.into_iter().map(|edge| edge.message_id).collect())
    }

    /// Like counts for a batch of messages, keyed by message id. Messages
    /// with no likes are absent from the map.
    pub async fn counts_for_messages(&self, message_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = likes::Entity::find()
            .select_only()
            .column(likes::Column::MessageId)
            .column_as(likes::Column::UserId.count(), "count")
            .filter(likes::Column::MessageId.is_in(message_ids.to_vec()))
            .group_by(likes::Column::MessageId)
            .into_model::<LikeCountRow>()
            .all(&self.conn)
            .await
            .context("Failed to count likes")?;

        Ok(rows
            .into_iter()
            .map(|row| (row.message_id, row.count))
            .collect())
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        let count = likes::Entity::find()
            .filter(likes::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count likes")?;

        Ok(count)
    }
}
