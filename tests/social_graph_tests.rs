//! Multi-step flows over the follow graph, profile edits, and account
//! deletion cascades.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use finch::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("finch-graph-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());

    let state = finch::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    finch::api::router(state).await
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing set-cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: &serde_json::Value,
) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn post_empty(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Sign up a user and return their id and session cookie.
async fn signup(app: &Router, username: &str) -> (i64, String) {
    let response = post_json(
        app,
        "/signup",
        None,
        &serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = session_cookie(&response);
    let body = body_json(response).await;
    (body["data"]["id"].as_i64().unwrap(), cookie)
}

async fn post_message(app: &Router, cookie: &str, text: &str) -> i64 {
    let response = post_json(
        app,
        "/messages/new",
        Some(cookie),
        &serde_json::json!({"text": text}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_follow_unfollow_flow() {
    let app = spawn_app().await;
    let (alice_id, alice) = signup(&app, "alice").await;
    let (bob_id, bob) = signup(&app, "bob").await;

    let response = post_empty(&app, &format!("/users/follow/{bob_id}"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "bob");

    // Alice sees herself following bob on his profile; bob does not follow
    // her back.
    let response = get(&app, &format!("/users/{bob_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["viewer_following"], true);
    assert_eq!(body["data"]["follows_viewer"], false);
    assert_eq!(body["data"]["stats"]["followers"], 1);

    // Following twice is a no-op, not an error.
    let response = post_empty(&app, &format!("/users/follow/{bob_id}"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &format!("/users/{bob_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["stats"]["followers"], 1);

    // Adjacency lists from both directions.
    let response = get(&app, &format!("/users/{alice_id}/following"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["username"], "bob");

    let response = get(&app, &format!("/users/{bob_id}/followers"), Some(&bob)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["username"], "alice");

    let response = post_empty(
        &app,
        &format!("/users/stop-following/{bob_id}"),
        Some(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &format!("/users/{bob_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["viewer_following"], false);
    assert_eq!(body["data"]["stats"]["followers"], 0);

    // Unfollowing an absent edge is also a no-op.
    let response = post_empty(
        &app,
        &format!("/users/stop-following/{bob_id}"),
        Some(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let app = spawn_app().await;
    let (alice_id, alice) = signup(&app, "alice").await;

    let response = post_empty(&app, &format!("/users/follow/{alice_id}"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, &format!("/users/{alice_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["stats"]["followers"], 0);
    assert_eq!(body["data"]["stats"]["following"], 0);
}

#[tokio::test]
async fn test_follow_unknown_user_is_404() {
    let app = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;

    let response = post_empty(&app, "/users/follow/9999", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_empty(&app, "/users/stop-following/9999", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_edit_requires_current_password() {
    let app = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;

    let response = post_json(
        &app,
        "/users/profile",
        Some(&alice),
        &serde_json::json!({"bio": "hacked", "password": "wrong-password"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No change was applied.
    let response = get(&app, "/users/profile", Some(&alice)).await;
    let body = body_json(response).await;
    assert!(body["data"]["bio"].is_null());

    let response = post_json(
        &app,
        "/users/profile",
        Some(&alice),
        &serde_json::json!({
            "bio": "birdwatcher",
            "location": "The Hague",
            "password": "password123",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["bio"], "birdwatcher");
    assert_eq!(body["data"]["location"], "The Hague");

    // An empty string clears an optional field.
    let response = post_json(
        &app,
        "/users/profile",
        Some(&alice),
        &serde_json::json!({"bio": "", "password": "password123"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["bio"].is_null());
    assert_eq!(body["data"]["location"], "The Hague");
}

#[tokio::test]
async fn test_profile_edit_rejects_taken_username() {
    let app = spawn_app().await;
    let (_, _bob) = signup(&app, "bob").await;
    let (_, alice) = signup(&app, "alice").await;

    let response = post_json(
        &app,
        "/users/profile",
        Some(&alice),
        &serde_json::json!({"username": "bob", "password": "password123"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(&app, "/users/profile", Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_account_deletion_cascades() {
    let app = spawn_app().await;
    let (alice_id, alice) = signup(&app, "alice").await;
    let (bob_id, bob) = signup(&app, "bob").await;

    // Bob posts, alice follows him and likes his message.
    let message_id = post_message(&app, &bob, "soon to disappear").await;
    post_empty(&app, &format!("/users/follow/{bob_id}"), Some(&alice)).await;
    let response = post_empty(&app, &format!("/messages/{message_id}/likes"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_empty(&app, "/users/delete", Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The account, its messages, and every edge pointing at it are gone.
    let response = get(&app, &format!("/users/{bob_id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &format!("/messages/{message_id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &format!("/users/{alice_id}/likes"), Some(&alice)).await;
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let response = get(&app, &format!("/users/{alice_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["stats"]["following"], 0);

    // Bob's old session no longer authenticates.
    let response = get(&app, "/users/profile", Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
