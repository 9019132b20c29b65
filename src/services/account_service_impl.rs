//! SeaORM-backed implementation of [`AccountService`].

use async_trait::async_trait;
use sea_orm::SqlErr;

use crate::config::SecurityConfig;
use crate::constants::{defaults, limits};
use crate::db::{NewUserRecord, ProfileUpdateRecord, Store, User};
use crate::services::credentials;

use super::account_service::{
    AccountError, AccountService, NewAccount, ProfileChanges, UserStats,
};

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Map a unique-constraint violation from the users table to the
    /// matching duplicate error, if that is what `err` holds.
    fn duplicate_identity(err: &anyhow::Error) -> Option<AccountError> {
        let db_err = err.downcast_ref::<sea_orm::DbErr>()?;

        match db_err.sql_err()? {
            SqlErr::UniqueConstraintViolation(detail) => {
                if detail.contains("users.email") {
                    Some(AccountError::DuplicateEmail)
                } else {
                    Some(AccountError::DuplicateUsername)
                }
            }
            _ => None,
        }
    }

    fn validate_identity(username: &str, email: &str) -> Result<(), AccountError> {
        if username.trim().is_empty() {
            return Err(AccountError::Validation(
                "Username must not be empty".to_string(),
            ));
        }

        if username.chars().count() > limits::USERNAME_MAX_CHARS {
            return Err(AccountError::Validation(format!(
                "Username must be at most {} characters",
                limits::USERNAME_MAX_CHARS
            )));
        }

        if email.trim().is_empty() {
            return Err(AccountError::Validation(
                "Email must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.is_empty())
    }

    /// `None` keeps the current image, an empty string resets to the
    /// default, anything else replaces it.
    fn resolve_image(change: Option<String>, current: String, default_url: &str) -> String {
        match change {
            None => current,
            Some(url) if url.is_empty() => default_url.to_string(),
            Some(url) => url,
        }
    }

    /// `None` keeps the current value, an empty string clears it.
    fn resolve_optional(change: Option<String>, current: Option<String>) -> Option<String> {
        match change {
            None => current,
            Some(value) if value.is_empty() => None,
            Some(value) => Some(value),
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn signup(&self, account: NewAccount) -> Result<User, AccountError> {
        Self::validate_identity(&account.username, &account.email)?;

        if account.password.chars().count() < limits::PASSWORD_MIN_CHARS {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters",
                limits::PASSWORD_MIN_CHARS
            )));
        }

        let is_admin = match (&self.security.admin_password, &account.admin_secret) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        };

        let password_hash = credentials::hash(account.password, self.security.clone()).await?;

        let record = NewUserRecord {
            username: account.username,
            email: account.email,
            password_hash,
            image_url: Self::non_empty(account.image_url)
                .unwrap_or_else(|| defaults::PROFILE_IMAGE_URL.to_string()),
            header_image_url: Self::non_empty(account.header_image_url)
                .unwrap_or_else(|| defaults::HEADER_IMAGE_URL.to_string()),
            bio: Self::non_empty(account.bio),
            location: Self::non_empty(account.location),
            is_admin,
        };

        match self.store.create_user(record).await {
            Ok(model) => Ok(User::from(model)),
            Err(err) => Err(Self::duplicate_identity(&err)
                .unwrap_or_else(|| AccountError::Internal(err.to_string()))),
        }
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AccountError> {
        let Some((user, password_hash)) =
            self.store.get_user_by_username_with_hash(username).await?
        else {
            return Ok(None);
        };

        let valid = credentials::verify(password.to_string(), password_hash).await?;

        Ok(valid.then_some(user))
    }

    async fn get_user(&self, user_id: i32) -> Result<Option<User>, AccountError> {
        Ok(self.store.get_user(user_id).await?)
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>, AccountError> {
        Ok(self.store.search_users(query.trim()).await?)
    }

    async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<(), AccountError> {
        if follower_id == followed_id {
            return Err(AccountError::SelfFollow);
        }

        if self.store.get_user(followed_id).await?.is_none() {
            return Err(AccountError::UserNotFound);
        }

        self.store.add_follow(follower_id, followed_id).await?;

        Ok(())
    }

    async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<(), AccountError> {
        if self.store.get_user(followed_id).await?.is_none() {
            return Err(AccountError::UserNotFound);
        }

        self.store.remove_follow(follower_id, followed_id).await?;

        Ok(())
    }

    async fn is_following(
        &self,
        follower_id: i32,
        followed_id: i32,
    ) -> Result<bool, AccountError> {
        Ok(self.store.follow_exists(follower_id, followed_id).await?)
    }

    async fn is_followed_by(
        &self,
        user_id: i32,
        follower_id: i32,
    ) -> Result<bool, AccountError> {
        Ok(self.store.follow_exists(follower_id, user_id).await?)
    }

    async fn following_of(&self, user_id: i32) -> Result<Vec<User>, AccountError> {
        let ids = self.store.following_ids(user_id).await?;
        let mut users = self.store.get_users_by_ids(&ids).await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn followers_of(&self, user_id: i32) -> Result<Vec<User>, AccountError> {
        let ids = self.store.follower_ids(user_id).await?;
        let mut users = self.store.get_users_by_ids(&ids).await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        current_password: &str,
        changes: ProfileChanges,
    ) -> Result<User, AccountError> {
        let Some((user, password_hash)) = self.store.get_user_with_hash(user_id).await? else {
            return Err(AccountError::UserNotFound);
        };

        let valid = credentials::verify(current_password.to_string(), password_hash).await?;
        if !valid {
            return Err(AccountError::InvalidCredentials);
        }

        let username = changes.username.unwrap_or(user.username);
        let email = changes.email.unwrap_or(user.email);
        Self::validate_identity(&username, &email)?;

        let record = ProfileUpdateRecord {
            username,
            email,
            image_url: Self::resolve_image(
                changes.image_url,
                user.image_url,
                defaults::PROFILE_IMAGE_URL,
            ),
            header_image_url: Self::resolve_image(
                changes.header_image_url,
                user.header_image_url,
                defaults::HEADER_IMAGE_URL,
            ),
            bio: Self::resolve_optional(changes.bio, user.bio),
            location: Self::resolve_optional(changes.location, user.location),
        };

        match self.store.update_user_profile(user_id, record).await {
            Ok(Some(model)) => Ok(User::from(model)),
            Ok(None) => Err(AccountError::UserNotFound),
            Err(err) => Err(Self::duplicate_identity(&err)
                .unwrap_or_else(|| AccountError::Internal(err.to_string()))),
        }
    }

    async fn delete_account(&self, user_id: i32) -> Result<(), AccountError> {
        let deleted = self.store.delete_user_cascading(user_id).await?;

        if !deleted {
            return Err(AccountError::UserNotFound);
        }

        Ok(())
    }

    async fn user_stats(&self, user_id: i32) -> Result<UserStats, AccountError> {
        Ok(UserStats {
            messages: self.store.count_messages_for_author(user_id).await?,
            following: self.store.count_following(user_id).await?,
            followers: self.store.count_followers(user_id).await?,
            likes: self.store.count_likes_for_user(user_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_image_keeps_current_when_absent() {
        let resolved = SeaOrmAccountService::resolve_image(
            None,
            "/custom.png".to_string(),
            defaults::PROFILE_IMAGE_URL,
        );
        assert_eq!(resolved, "/custom.png");
    }

    #[test]
    fn test_resolve_image_resets_on_empty() {
        let resolved = SeaOrmAccountService::resolve_image(
            Some(String::new()),
            "/custom.png".to_string(),
            defaults::PROFILE_IMAGE_URL,
        );
        assert_eq!(resolved, defaults::PROFILE_IMAGE_URL);
    }

    #[test]
    fn test_resolve_image_replaces_on_value() {
        let resolved = SeaOrmAccountService::resolve_image(
            Some("/new.png".to_string()),
            "/custom.png".to_string(),
            defaults::PROFILE_IMAGE_URL,
        );
        assert_eq!(resolved, "/new.png");
    }

    #[test]
    fn test_resolve_optional_clears_on_empty() {
        let kept = SeaOrmAccountService::resolve_optional(None, Some("here".to_string()));
        assert_eq!(kept.as_deref(), Some("here"));

        let cleared =
            SeaOrmAccountService::resolve_optional(Some(String::new()), Some("here".to_string()));
        assert!(cleared.is_none());
    }

    #[test]
    fn test_validate_identity() {
        assert!(SeaOrmAccountService::validate_identity("alice", "a@b.io").is_ok());
        assert!(SeaOrmAccountService::validate_identity("", "a@b.io").is_err());
        assert!(SeaOrmAccountService::validate_identity("   ", "a@b.io").is_err());
        assert!(SeaOrmAccountService::validate_identity("alice", "").is_err());

        let long = "a".repeat(limits::USERNAME_MAX_CHARS + 1);
        assert!(SeaOrmAccountService::validate_identity(&long, "a@b.io").is_err());
    }
}
