use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod home;
mod messages;
mod observability;
pub mod session;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{
    AccountService, FeedService, MessageService, SeaOrmAccountService, SeaOrmFeedService,
    SeaOrmMessageService,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub account_service: Arc<dyn AccountService>,

    pub message_service: Arc<dyn MessageService>,

    pub feed_service: Arc<dyn FeedService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.account_service
    }

    #[must_use]
    pub fn messages(&self) -> &Arc<dyn MessageService> {
        &self.message_service
    }

    #[must_use]
    pub fn feed(&self) -> &Arc<dyn FeedService> {
        &self.feed_service
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let config = shared.config().await;

    let account_service: Arc<dyn AccountService> = Arc::new(SeaOrmAccountService::new(
        shared.store.clone(),
        config.security.clone(),
    ));

    let message_service: Arc<dyn MessageService> =
        Arc::new(SeaOrmMessageService::new(shared.store.clone()));

    let feed_service: Arc<dyn FeedService> = Arc::new(SeaOrmFeedService::new(
        shared.store.clone(),
        message_service.clone(),
    ));

    Arc::new(AppState {
        shared,
        account_service,
        message_service,
        feed_service,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle).await)
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_ttl_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.security.session_ttl_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_ttl_minutes,
        )));

    let api_router = Router::new()
        .route("/", get(home::home))
        .route("/signup", get(auth::session_info).post(auth::signup))
        .route("/login", get(auth::session_info).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list_users))
        .route(
            "/users/profile",
            get(users::get_profile).post(users::update_profile),
        )
        .route("/users/delete", post(users::delete_account))
        .route("/users/follow/{id}", post(users::follow_user))
        .route("/users/stop-following/{id}", post(users::unfollow_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/following", get(users::list_following))
        .route("/users/{id}/followers", get(users::list_followers))
        .route("/users/{id}/likes", get(users::list_likes))
        .route("/messages/new", post(messages::create_message))
        .route("/messages/{id}", get(messages::get_message))
        .route("/messages/{id}/delete", post(messages::delete_message))
        .route("/messages/{id}/likes", post(messages::toggle_like))
        .route("/metrics", get(observability::get_metrics))
        .fallback(not_found)
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    api_router
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::response_headers_middleware,
        ))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}
