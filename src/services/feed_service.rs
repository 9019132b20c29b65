//! Home feed composition from the follow graph and the message ledger.

use async_trait::async_trait;
use thiserror::Error;

use super::message_service::MessageView;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FeedError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FeedError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait]
pub trait FeedService: Send + Sync {
    /// The viewer's home feed: messages from followed users plus the viewer
    /// themself, newest first, capped at the feed window.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Database`] or [`FeedError::Internal`] for
    /// infrastructure failures.
    async fn home_feed(&self, viewer_id: i32) -> Result<Vec<MessageView>, FeedError>;
}
