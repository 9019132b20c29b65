//! SeaORM-backed implementation of [`FeedService`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::constants::limits;
use crate::db::Store;

use super::feed_service::{FeedError, FeedService};
use super::message_service::{MessageError, MessageService, MessageView};

pub struct SeaOrmFeedService {
    store: Store,
    messages: Arc<dyn MessageService>,
}

impl SeaOrmFeedService {
    #[must_use]
    pub const fn new(store: Store, messages: Arc<dyn MessageService>) -> Self {
        Self { store, messages }
    }
}

#[async_trait]
impl FeedService for SeaOrmFeedService {
    async fn home_feed(&self, viewer_id: i32) -> Result<Vec<MessageView>, FeedError> {
        let mut author_ids = self.store.following_ids(viewer_id).await?;
        author_ids.push(viewer_id);

        let views = self
            .messages
            .latest_by_authors(&author_ids, Some(viewer_id), limits::HOME_FEED_WINDOW)
            .await
            .map_err(|err| match err {
                MessageError::Database(msg) => FeedError::Database(msg),
                other => FeedError::Internal(other.to_string()),
            })?;

        Ok(views)
    }
}
