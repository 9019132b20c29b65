//! Session gate: the single place handlers resolve "who is calling?".

use tower_sessions::Session;

use crate::constants::session::USER_KEY;
use crate::db::{Store, User};

use super::ApiError;

/// The signed-in user, or `None` for anonymous callers. A session pointing
/// at a deleted account is treated as anonymous and scrubbed.
pub async fn current_user(store: &Store, session: &Session) -> Result<Option<User>, ApiError> {
    let user_id = session
        .get::<i32>(USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {}", e)))?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let user = store
        .get_user(user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load session user: {}", e)))?;

    if user.is_none() {
        let _ = session.remove::<i32>(USER_KEY).await;
    }

    Ok(user)
}

/// Like [`current_user`], but anonymous callers get the standard 401.
pub async fn require_user(store: &Store, session: &Session) -> Result<User, ApiError> {
    current_user(store, session)
        .await?
        .ok_or_else(ApiError::unauthorized)
}

pub async fn start(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session
        .insert(USER_KEY, user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {}", e)))
}

/// Drop the whole session, not just the user key, so nothing stale
/// survives logout.
pub async fn end(session: &Session) {
    let _ = session.flush().await;
}
