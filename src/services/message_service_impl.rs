//! SeaORM-backed implementation of [`MessageService`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::constants::limits;
use crate::db::{Store, ToggleOutcome, User};
use crate::entities::messages;

use super::message_service::{LikeOutcome, MessageError, MessageService, MessageView};

pub struct SeaOrmMessageService {
    store: Store,
}

impl SeaOrmMessageService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn validate_text(text: &str) -> Result<(), MessageError> {
        if text.trim().is_empty() {
            return Err(MessageError::Validation(
                "Message text must not be empty".to_string(),
            ));
        }

        if text.chars().count() > limits::MESSAGE_MAX_CHARS {
            return Err(MessageError::Validation(format!(
                "Message text must be at most {} characters",
                limits::MESSAGE_MAX_CHARS
            )));
        }

        Ok(())
    }

    /// Join message rows with their authors, like counts, and the viewer's
    /// own likes. Row order is preserved.
    async fn hydrate(
        &self,
        rows: Vec<messages::Model>,
        viewer_id: Option<i32>,
    ) -> Result<Vec<MessageView>, MessageError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let message_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

        let mut author_ids: Vec<i32> = rows.iter().map(|row| row.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i32, User> = self
            .store
            .get_users_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let like_counts = self.store.like_counts_for_messages(&message_ids).await?;

        let viewer_likes: HashSet<i32> = match viewer_id {
            Some(id) => self
                .store
                .liked_ids_among(id, &message_ids)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            // Author rows can vanish between the two queries; skip orphans.
            let Some(author) = authors.get(&row.user_id).cloned() else {
                continue;
            };

            views.push(MessageView {
                id: row.id,
                text: row.text,
                created_at: row.created_at,
                author,
                like_count: like_counts.get(&row.id).copied().unwrap_or(0),
                liked_by_viewer: viewer_likes.contains(&row.id),
            });
        }

        Ok(views)
    }

    async fn hydrate_one(
        &self,
        row: messages::Model,
        viewer_id: Option<i32>,
    ) -> Result<MessageView, MessageError> {
        let mut views = self.hydrate(vec![row], viewer_id).await?;
        views.pop().ok_or(MessageError::NotFound)
    }
}

#[async_trait]
impl MessageService for SeaOrmMessageService {
    async fn post(&self, author_id: i32, text: &str) -> Result<MessageView, MessageError> {
        Self::validate_text(text)?;

        let model = self.store.create_message(author_id, text.to_string()).await?;

        self.hydrate_one(model, Some(author_id)).await
    }

    async fn get(
        &self,
        message_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<MessageView, MessageError> {
        let Some(model) = self.store.get_message(message_id).await? else {
            return Err(MessageError::NotFound);
        };

        self.hydrate_one(model, viewer_id).await
    }

    async fn delete(&self, message_id: i32, requester_id: i32) -> Result<(), MessageError> {
        let Some(model) = self.store.get_message(message_id).await? else {
            return Err(MessageError::NotFound);
        };

        if model.user_id != requester_id {
            return Err(MessageError::NotOwner);
        }

        self.store.delete_message(message_id).await?;

        Ok(())
    }

    async fn toggle_like(
        &self,
        user_id: i32,
        message_id: i32,
    ) -> Result<LikeOutcome, MessageError> {
        match self.store.toggle_like(user_id, message_id).await? {
            ToggleOutcome::Liked => Ok(LikeOutcome::Liked),
            ToggleOutcome::Unliked => Ok(LikeOutcome::Unliked),
            ToggleOutcome::MessageMissing => Err(MessageError::NotFound),
            ToggleOutcome::OwnMessage => Err(MessageError::OwnMessage),
        }
    }

    async fn messages_of(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Vec<MessageView>, MessageError> {
        let rows = self.store.messages_for_author(user_id).await?;
        self.hydrate(rows, viewer_id).await
    }

    async fn liked_by(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Vec<MessageView>, MessageError> {
        let liked_ids = self.store.liked_message_ids(user_id).await?;
        let mut rows = self.store.get_messages_by_ids(&liked_ids).await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.hydrate(rows, viewer_id).await
    }

    async fn latest_by_authors(
        &self,
        author_ids: &[i32],
        viewer_id: Option<i32>,
        limit: u64,
    ) -> Result<Vec<MessageView>, MessageError> {
        let rows = self
            .store
            .latest_messages_for_authors(author_ids, limit)
            .await?;

        self.hydrate(rows, viewer_id).await
    }
}
