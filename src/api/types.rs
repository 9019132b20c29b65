use serde::Serialize;

use crate::db::User;
use crate::services::{MessageView, UserStats};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public summary of a user, embedded in lists and message documents.
#[derive(Debug, Serialize, Clone)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            image_url: user.image_url,
            bio: user.bio,
            location: user.location,
        }
    }
}

/// The signed-in user's own account, email included.
#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for AccountDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image_url: user.image_url,
            header_image_url: user.header_image_url,
            bio: user.bio,
            location: user.location,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserStatsDto {
    pub messages: u64,
    pub following: u64,
    pub followers: u64,
    pub likes: u64,
}

impl From<UserStats> for UserStatsDto {
    fn from(stats: UserStats) -> Self {
        Self {
            messages: stats.messages,
            following: stats.following,
            followers: stats.followers,
            likes: stats.likes,
        }
    }
}

/// Full profile page document for one user.
#[derive(Debug, Serialize)]
pub struct UserDetailDto {
    pub id: i32,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
    pub stats: UserStatsDto,
    /// Whether the signed-in viewer follows this user. False when anonymous.
    pub viewer_following: bool,
    /// Whether this user follows the signed-in viewer. False when anonymous.
    pub follows_viewer: bool,
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: i32,
    pub text: String,
    pub created_at: String,
    pub author: UserDto,
    pub like_count: i64,
    /// Whether the signed-in viewer has liked this message. False when
    /// anonymous.
    pub liked_by_viewer: bool,
}

impl From<MessageView> for MessageDto {
    fn from(view: MessageView) -> Self {
        Self {
            id: view.id,
            text: view.text,
            created_at: view.created_at,
            author: UserDto::from(view.author),
            like_count: view.like_count,
            liked_by_viewer: view.liked_by_viewer,
        }
    }
}

/// Session status document served on the signup and login pages.
#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountDto>,
}

#[derive(Debug, Serialize)]
pub struct LoginDto {
    pub message: String,
    pub user: AccountDto,
}

#[derive(Debug, Serialize)]
pub struct LikeToggleDto {
    pub liked: bool,
    pub message: String,
}

/// Home document. Signed-in viewers get their feed; anonymous visitors get
/// the landing banner.
#[derive(Debug, Serialize)]
pub struct HomeDto {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Vec<MessageDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
