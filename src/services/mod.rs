pub mod credentials;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService, NewAccount, ProfileChanges, UserStats};
pub use account_service_impl::SeaOrmAccountService;

pub mod message_service;
pub mod message_service_impl;
pub use message_service::{LikeOutcome, MessageError, MessageService, MessageView};
pub use message_service_impl::SeaOrmMessageService;

pub mod feed_service;
pub mod feed_service_impl;
pub use feed_service::{FeedError, FeedService};
pub use feed_service_impl::SeaOrmFeedService;
