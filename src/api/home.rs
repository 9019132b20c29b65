use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::types::{HomeDto, MessageDto};
use super::{ApiError, ApiResponse, AppState, session};

/// GET /. Signed-in users get their home feed; anonymous visitors get the
/// landing banner.
pub async fn home(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<HomeDto>>, ApiError> {
    let Some(user) = session::current_user(state.store(), &session).await? else {
        return Ok(Json(ApiResponse::success(HomeDto {
            authenticated: false,
            feed: None,
            message: Some("Sign up now to get your own personalized timeline!".to_string()),
        })));
    };

    let views = state.feed().home_feed(user.id).await?;

    Ok(Json(ApiResponse::success(HomeDto {
        authenticated: true,
        feed: Some(views.into_iter().map(MessageDto::from).collect()),
        message: None,
    })))
}
