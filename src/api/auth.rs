use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::services::NewAccount;

use super::types::{AccountDto, LoginDto, MessageResponse, SessionDto};
use super::{ApiError, ApiResponse, AppState, session, validation};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Optional secret that promotes the new account to admin when it
    /// matches the configured value.
    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /signup. Creates the account and signs the new user in.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    validation::validate_username(&payload.username)?;
    validation::validate_email(&payload.email)?;
    validation::validate_password(&payload.password)?;

    let account = NewAccount {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        image_url: payload.image_url,
        header_image_url: payload.header_image_url,
        bio: payload.bio,
        location: payload.location,
        admin_secret: payload.admin_password,
    };

    let user = state.accounts().signup(account).await?;

    session::start(&session, user.id).await?;

    tracing::info!(user_id = user.id, username = %user.username, "New account created");

    Ok(Json(ApiResponse::success(AccountDto::from(user))))
}

/// POST /login. Verifies credentials and opens a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginDto>>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let user = state
        .accounts()
        .authenticate(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials.".to_string()))?;

    session::start(&session, user.id).await?;

    Ok(Json(ApiResponse::success(LoginDto {
        message: format!("Hello, {}!", user.username),
        user: AccountDto::from(user),
    })))
}

/// GET /logout. Always succeeds, even without a session.
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    session::end(&session).await;

    Json(ApiResponse::success(MessageResponse {
        message: "Successfully logged out.".to_string(),
    }))
}

/// GET /signup and GET /login. Reports whether the caller is already
/// signed in, so clients can skip the forms.
pub async fn session_info(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    let user = session::current_user(state.store(), &session).await?;

    Ok(Json(ApiResponse::success(SessionDto {
        authenticated: user.is_some(),
        user: user.map(AccountDto::from),
    })))
}
