//! Message posting, author-only deletion, like toggling, and the home feed.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use finch::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<finch::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("finch-message-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());

    let state = finch::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = finch::api::router(state.clone()).await;
    (state, router)
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
async fn test_post_and_read_message() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;

    let message_id = post_message(&app, &alice, "first post!").await;

    // Readable without a session.
    let response = get(&app, &format!("/messages/{message_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["text"], "first post!");
    assert_eq!(body["data"]["author"]["username"], "alice");
    assert_eq!(body["data"]["like_count"], 0);
    assert_eq!(body["data"]["liked_by_viewer"], false);
}

#[tokio::test]
async fn test_message_text_bounds() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;

    let response = post_json(
        &app,
        "/messages/new",
        Some(&alice),
        &serde_json::json!({"text": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/messages/new",
        Some(&alice),
        &serde_json::json!({"text": "   "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let over_limit = "x".repeat(141);
    let response = post_json(
        &app,
        "/messages/new",
        Some(&alice),
        &serde_json::json!({"text": over_limit}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Exactly at the limit is fine.
    let at_limit = "x".repeat(140);
    let response = post_json(
        &app,
        "/messages/new",
        Some(&alice),
        &serde_json::json!({"text": at_limit}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_only_the_author_may_delete() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;
    let (_, mallory) = signup(&app, "mallory").await;

    let message_id = post_message(&app, &alice, "keep out").await;

    let response = post_empty(&app, &format!("/messages/{message_id}/delete"), Some(&mallory))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Still there.
    let response = get(&app, &format!("/messages/{message_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        post_empty(&app, &format!("/messages/{message_id}/delete"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &format!("/messages/{message_id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggle_is_an_involution() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;
    let (_, bob) = signup(&app, "bob").await;

    let message_id = post_message(&app, &bob, "like me").await;

    let response = post_empty(&app, &format!("/messages/{message_id}/likes"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["liked"], true);

    let response = get(&app, &format!("/messages/{message_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["like_count"], 1);
    assert_eq!(body["data"]["liked_by_viewer"], true);

    // Toggling again removes the like and restores the original state.
    let response = post_empty(&app, &format!("/messages/{message_id}/likes"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["liked"], false);

    let response = get(&app, &format!("/messages/{message_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["like_count"], 0);
    assert_eq!(body["data"]["liked_by_viewer"], false);
}

#[tokio::test]
async fn test_liking_your_own_message_is_forbidden() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;

    let message_id = post_message(&app, &alice, "my own words").await;

    let response = post_empty(&app, &format!("/messages/{message_id}/likes"), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No edge was left behind.
    let response = get(&app, &format!("/messages/{message_id}"), Some(&alice)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["like_count"], 0);
}

#[tokio::test]
async fn test_liking_an_unknown_message_is_404() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;

    let response = post_empty(&app, "/messages/9999/likes", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_liked_messages_listing() {
    let (_, app) = spawn_app().await;
    let (alice_id, alice) = signup(&app, "alice").await;
    let (_, bob) = signup(&app, "bob").await;

    let first = post_message(&app, &bob, "first").await;
    let second = post_message(&app, &bob, "second").await;
    post_empty(&app, &format!("/messages/{first}/likes"), Some(&alice)).await;
    post_empty(&app, &format!("/messages/{second}/likes"), Some(&alice)).await;

    let response = get(&app, &format!("/users/{alice_id}/likes"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let texts: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"first"));
    assert!(texts.contains(&"second"));
}

#[tokio::test]
async fn test_home_feed_membership_and_order() {
    let (_, app) = spawn_app().await;
    let (_, alice) = signup(&app, "alice").await;
    let (bob_id, bob) = signup(&app, "bob").await;
    let (_, carol) = signup(&app, "carol").await;

    post_message(&app, &bob, "bob one").await;
    post_message(&app, &carol, "carol one").await;
    post_message(&app, &alice, "alice one").await;
    post_message(&app, &bob, "bob two").await;

    post_empty(&app, &format!("/users/follow/{bob_id}"), Some(&alice)).await;

    let response = get(&app, "/", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["authenticated"], true);

    let feed = body["data"]["feed"].as_array().unwrap();
    let texts: Vec<&str> = feed.iter().map(|m| m["text"].as_str().unwrap()).collect();

    // Only alice's own messages and bob's; never carol's.
    assert_eq!(texts, vec!["bob two", "alice one", "bob one"]);

    // Newest first.
    let timestamps: Vec<&str> = feed
        .iter()
        .map(|m| m["created_at"].as_str().unwrap())
        .collect();
    for pair in timestamps.windows(2) {
        assert!(pair[0] >= pair[1], "feed is not sorted newest first");
    }

    // Bob does not follow alice, so his feed has only his own posts.
    let response = get(&app, "/", Some(&bob)).await;
    let body = body_json(response).await;
    let texts: Vec<&str> = body["data"]["feed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["bob two", "bob one"]);
}

#[tokio::test]
async fn test_home_feed_window_is_capped() {
    let (state, app) = spawn_app().await;
    let (alice_id, alice) = signup(&app, "alice").await;

    // Seed past the window straight through the store.
    for n in 0..120 {
        state
            .store()
            .create_message(i32::try_from(alice_id).unwrap(), format!("message {n}"))
            .await
            .expect("failed to seed message");
    }

    let response = get(&app, "/", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["feed"].as_array().unwrap().len(), 100);
}
