//! Account directory: signup, credential checks, profiles, and the
//! follow graph.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::User;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Email already taken")]
    DuplicateEmail,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Users cannot follow themselves")]
    SelfFollow,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Everything needed to open an account. Optional presentation fields fall
/// back to the stock images when empty or absent.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Matched against the configured admin password. A wrong or absent
    /// value creates a regular account.
    pub admin_secret: Option<String>,
}

/// Partial profile edit. `None` keeps the stored value; an empty string
/// resets images to their defaults and clears bio or location.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserStats {
    pub messages: u64,
    pub following: u64,
    pub followers: u64,
    pub likes: u64,
}

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and return the stored user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::DuplicateUsername`] or
    /// [`AccountError::DuplicateEmail`] when the identity is already taken,
    /// and [`AccountError::Validation`] for malformed fields.
    async fn signup(&self, account: NewAccount) -> Result<User, AccountError>;

    /// Check credentials, returning the user on success and `None` on any
    /// mismatch. Unknown usernames and wrong passwords are indistinguishable
    /// to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Database`] or [`AccountError::Internal`] only
    /// for infrastructure failures, never for bad credentials.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AccountError>;

    async fn get_user(&self, user_id: i32) -> Result<Option<User>, AccountError>;

    /// Case-insensitive substring search on username. An empty query lists
    /// every user.
    async fn search_users(&self, query: &str) -> Result<Vec<User>, AccountError>;

    /// Add a follow edge. Following someone twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::SelfFollow`] when both ids match and
    /// [`AccountError::UserNotFound`] when the target does not exist.
    async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<(), AccountError>;

    /// Remove a follow edge. Removing an absent edge is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`] when the target does not exist.
    async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<(), AccountError>;

    async fn is_following(
        &self,
        follower_id: i32,
        followed_id: i32,
    ) -> Result<bool, AccountError>;

    async fn is_followed_by(
        &self,
        user_id: i32,
        follower_id: i32,
    ) -> Result<bool, AccountError>;

    /// Users that `user_id` follows, ordered by username.
    async fn following_of(&self, user_id: i32) -> Result<Vec<User>, AccountError>;

    /// Users following `user_id`, ordered by username.
    async fn followers_of(&self, user_id: i32) -> Result<Vec<User>, AccountError>;

    /// Apply profile changes after re-checking the account password.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] when the password does
    /// not match, and the duplicate-identity errors when a new username or
    /// email collides.
    async fn update_profile(
        &self,
        user_id: i32,
        current_password: &str,
        changes: ProfileChanges,
    ) -> Result<User, AccountError>;

    /// Delete the account along with its messages, likes, and follow edges.
    async fn delete_account(&self, user_id: i32) -> Result<(), AccountError>;

    async fn user_stats(&self, user_id: i32) -> Result<UserStats, AccountError>;
}
