use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::services::ProfileChanges;

use super::types::{AccountDto, MessageDto, MessageResponse, UserDetailDto, UserDto, UserStatsDto};
use super::{ApiError, ApiResponse, AppState, session, validation};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Current account password, re-checked before any change is applied.
    pub password: String,
}

/// GET /users. Username substring search; no query lists everyone.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let query = params.q.unwrap_or_default();

    let users = state.accounts().search_users(&query).await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/{id}. Profile document with stats and the user's messages.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDetailDto>>, ApiError> {
    let viewer = session::current_user(state.store(), &session).await?;
    let viewer_id = viewer.map(|user| user.id);

    let user = state
        .accounts()
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    let stats = state.accounts().user_stats(user_id).await?;
    let messages = state.messages().messages_of(user_id, viewer_id).await?;

    let (viewer_following, follows_viewer) = match viewer_id {
        Some(viewer_id) if viewer_id != user_id => (
            state.accounts().is_following(viewer_id, user_id).await?,
            state.accounts().is_followed_by(viewer_id, user_id).await?,
        ),
        _ => (false, false),
    };

    Ok(Json(ApiResponse::success(UserDetailDto {
        id: user.id,
        username: user.username,
        image_url: user.image_url,
        header_image_url: user.header_image_url,
        bio: user.bio,
        location: user.location,
        created_at: user.created_at,
        stats: UserStatsDto::from(stats),
        viewer_following,
        follows_viewer,
        messages: messages.into_iter().map(MessageDto::from).collect(),
    })))
}

/// GET /users/{id}/following. Who this user follows; signed-in users only.
pub async fn list_following(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    session::require_user(state.store(), &session).await?;

    if state.accounts().get_user(user_id).await?.is_none() {
        return Err(ApiError::user_not_found(user_id));
    }

    let users = state.accounts().following_of(user_id).await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/{id}/followers. Who follows this user; signed-in users only.
pub async fn list_followers(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    session::require_user(state.store(), &session).await?;

    if state.accounts().get_user(user_id).await?.is_none() {
        return Err(ApiError::user_not_found(user_id));
    }

    let users = state.accounts().followers_of(user_id).await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/{id}/likes. Messages this user has liked.
pub async fn list_likes(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    let viewer = session::current_user(state.store(), &session).await?;

    if state.accounts().get_user(user_id).await?.is_none() {
        return Err(ApiError::user_not_found(user_id));
    }

    let views = state
        .messages()
        .liked_by(user_id, viewer.map(|user| user.id))
        .await?;

    Ok(Json(ApiResponse::success(
        views.into_iter().map(MessageDto::from).collect(),
    )))
}

/// POST /users/follow/{id}. Start following; repeats are no-ops.
pub async fn follow_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    state.accounts().follow(current.id, user_id).await?;

    let target = state
        .accounts()
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    tracing::info!(
        follower_id = current.id,
        followed_id = user_id,
        "Follow edge added"
    );

    Ok(Json(ApiResponse::success(UserDto::from(target))))
}

/// POST /users/stop-following/{id}. Stop following; absent edges are no-ops.
pub async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    state.accounts().unfollow(current.id, user_id).await?;

    let target = state
        .accounts()
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    Ok(Json(ApiResponse::success(UserDto::from(target))))
}

/// GET /users/profile. The signed-in user's own account document.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    Ok(Json(ApiResponse::success(AccountDto::from(current))))
}

/// POST /users/profile. Edit the profile after re-checking the password.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    if let Some(username) = &payload.username {
        validation::validate_username(username)?;
    }
    if let Some(email) = &payload.email {
        validation::validate_email(email)?;
    }

    let changes = ProfileChanges {
        username: payload.username,
        email: payload.email,
        image_url: payload.image_url,
        header_image_url: payload.header_image_url,
        bio: payload.bio,
        location: payload.location,
    };

    let user = state
        .accounts()
        .update_profile(current.id, &payload.password, changes)
        .await?;

    Ok(Json(ApiResponse::success(AccountDto::from(user))))
}

/// POST /users/delete. Remove the account and everything attached to it.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    state.accounts().delete_account(current.id).await?;

    session::end(&session).await;

    tracing::info!(user_id = current.id, "Account deleted");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Account deleted.".to_string(),
    })))
}
