use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::services::{AccountError, FeedError, MessageError};

use super::ApiResponse;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    Forbidden(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateUsername | AccountError::DuplicateEmail => {
                ApiError::Conflict(err.to_string())
            }
            AccountError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AccountError::UserNotFound => ApiError::NotFound(err.to_string()),
            AccountError::SelfFollow | AccountError::Validation(_) => {
                ApiError::ValidationError(err.to_string())
            }
            AccountError::Database(msg) => ApiError::DatabaseError(msg),
            AccountError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::NotFound => ApiError::NotFound(err.to_string()),
            MessageError::NotOwner => ApiError::Unauthorized(err.to_string()),
            MessageError::OwnMessage => ApiError::Forbidden(err.to_string()),
            MessageError::Validation(_) => ApiError::ValidationError(err.to_string()),
            MessageError::Database(msg) => ApiError::DatabaseError(msg),
            MessageError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Database(msg) => ApiError::DatabaseError(msg),
            FeedError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn user_not_found(id: i32) -> Self {
        Self::not_found("User", id)
    }

    /// The one body every gated route answers with when no valid session is
    /// presented.
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Access unauthorized.".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
