use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::services::LikeOutcome;

use super::types::{LikeToggleDto, MessageDto, MessageResponse};
use super::{ApiError, ApiResponse, AppState, session, validation};

#[derive(Deserialize)]
pub struct NewMessageRequest {
    pub text: String,
}

/// POST /messages/new. Post a message as the signed-in user.
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<NewMessageRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    validation::validate_message_text(&payload.text)?;

    let view = state.messages().post(current.id, &payload.text).await?;

    tracing::info!(message_id = view.id, user_id = current.id, "Message posted");

    Ok(Json(ApiResponse::success(MessageDto::from(view))))
}

/// GET /messages/{id}. Single message with author and like data.
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(message_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let viewer = session::current_user(state.store(), &session).await?;

    let view = state
        .messages()
        .get(message_id, viewer.map(|user| user.id))
        .await?;

    Ok(Json(ApiResponse::success(MessageDto::from(view))))
}

/// POST /messages/{id}/delete. Authors may delete their own messages.
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(message_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    state.messages().delete(message_id, current.id).await?;

    tracing::info!(message_id, user_id = current.id, "Message deleted");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Message deleted.".to_string(),
    })))
}

/// POST /messages/{id}/likes. Flip the signed-in user's like on a message.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(message_id): Path<i32>,
) -> Result<Json<ApiResponse<LikeToggleDto>>, ApiError> {
    let current = session::require_user(state.store(), &session).await?;

    let outcome = state.messages().toggle_like(current.id, message_id).await?;

    let dto = match outcome {
        LikeOutcome::Liked => LikeToggleDto {
            liked: true,
            message: "Message liked!".to_string(),
        },
        LikeOutcome::Unliked => LikeToggleDto {
            liked: false,
            message: "Message unliked!".to_string(),
        },
    };

    Ok(Json(ApiResponse::success(dto)))
}
