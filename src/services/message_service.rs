//! Message ledger: posting, deletion, likes, and hydrated reads.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::User;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message not found")]
    NotFound,

    #[error("Access unauthorized.")]
    NotOwner,

    #[error("Can't like your own messages!")]
    OwnMessage,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for MessageError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MessageError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

/// A message joined with its author and like data, relative to an optional
/// viewer.
#[derive(Debug, Clone)]
pub struct MessageView {
    pub id: i32,
    pub text: String,
    pub created_at: String,
    pub author: User,
    pub like_count: i64,
    pub liked_by_viewer: bool,
}

#[async_trait]
pub trait MessageService: Send + Sync {
    /// Post a message as `author_id` and return it hydrated.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Validation`] for empty or over-length text.
    async fn post(&self, author_id: i32, text: &str) -> Result<MessageView, MessageError>;

    /// # Errors
    ///
    /// Returns [`MessageError::NotFound`] when no such message exists.
    async fn get(
        &self,
        message_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<MessageView, MessageError>;

    /// Delete a message. Only its author may do so.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::NotOwner`] when `requester_id` did not write
    /// the message.
    async fn delete(&self, message_id: i32, requester_id: i32) -> Result<(), MessageError>;

    /// Flip the requester's like on a message.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::OwnMessage`] when the requester wrote the
    /// message and [`MessageError::NotFound`] when it does not exist.
    async fn toggle_like(
        &self,
        user_id: i32,
        message_id: i32,
    ) -> Result<LikeOutcome, MessageError>;

    /// One author's messages, newest first.
    async fn messages_of(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Vec<MessageView>, MessageError>;

    /// Messages a user has liked, newest first.
    async fn liked_by(
        &self,
        user_id: i32,
        viewer_id: Option<i32>,
    ) -> Result<Vec<MessageView>, MessageError>;

    /// The newest messages across a set of authors, newest first, capped at
    /// `limit`.
    async fn latest_by_authors(
        &self,
        author_ids: &[i32],
        viewer_id: Option<i32>,
        limit: u64,
    ) -> Result<Vec<MessageView>, MessageError>;
}
