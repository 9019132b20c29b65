use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::entities::follows;

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a follow edge. Inserting an edge that already exists is a
    /// no-op, so concurrent duplicate requests cannot fail.
    pub async fn add(&self, follower_id: i32, followed_id: i32) -> Result<()> {
        follows::Entity::insert(follows::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
        })
        .on_conflict(
            OnConflict::columns([follows::Column::FollowerId, follows::Column::FollowedId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.conn)
        .await
        .context("Failed to insert follow edge")?;

        Ok(())
    }

    /// Remove a follow edge. Returns whether an edge was actually removed.
    pub async fn remove(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let result = follows::Entity::delete_by_id((follower_id, followed_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow edge")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let edge = follows::Entity::find_by_id((follower_id, followed_id))
            .one(&self.conn)
            .await
            .context("Failed to check follow edge")?;

        Ok(edge.is_some())
    }

    /// Ids of every user that `user_id` follows.
    pub async fn following_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to list followed users")?;

        Ok(edges.into_iter().map(|edge| edge.followed_id).collect())
    }

    /// Ids of every user following `user_id`.
    pub async fn follower_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FollowedId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to list followers")?;

        Ok(edges.into_iter().map(|edge| edge.follower_id).collect())
    }

    pub async fn count_following(&self, user_id: i32) -> Result<u64> {
        let count = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followed users")?;

        Ok(count)
    }

    pub async fn count_followers(&self, user_id: i32) -> Result<u64> {
        let count = follows::Entity::find()
            .filter(follows::Column::FollowedId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followers")?;

        Ok(count)
    }
}
