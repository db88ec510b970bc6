// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use blob_server::{api::router, config::AppConfig, state::AppState, storage::RelationPolicy};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    app_with(AppConfig::new("integration-secret"))
}

fn app_with(config: AppConfig) -> Router {
    router(AppState::in_memory(config).unwrap())
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
    text: String,
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        headers,
        body,
        text,
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> Reply {
    send(
        app,
        post(
            "/register",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await
}

/// Register and log in, returning the `Cookie` header value and the user id.
async fn sign_up(app: &Router, username: &str) -> (String, i64) {
    let reply = register(app, username, "password").await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = send(
        app,
        post(
            "/login",
            None,
            json!({ "username": username, "password": "password" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);

    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let id = reply.body["user"]["id"].as_i64().unwrap();
    (cookie, id)
}

async fn add_blob(app: &Router, cookie: &str, content: &str) -> i64 {
    let reply = send(
        app,
        post("/blob/add", Some(cookie), json!({ "content": content })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.body["blob"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn alice_and_bob_like_and_follow() {
    let app = app();
    let (alice, alice_id) = sign_up(&app, "alice").await;
    let (bob, bob_id) = sign_up(&app, "bob").await;

    let blob_id = add_blob(&app, &alice, "hello world").await;

    let reply = send(&app, get(&format!("/blob/{blob_id}"), None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["blob"]["content"], "hello world");
    assert_eq!(reply.body["blob"]["username"], "alice");
    assert_eq!(reply.body["blob"]["likes"], 0);

    let reply = send(&app, get(&format!("/blob/{blob_id}/like/toggle"), Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["liked"], true);

    let reply = send(&app, get(&format!("/blob/{blob_id}"), Some(&bob))).await;
    assert_eq!(reply.body["blob"]["likes"], 1);
    assert_eq!(reply.body["blob"]["liked"], true);
    assert_eq!(reply.body["blob"]["owned"], false);

    let reply = send(&app, get(&format!("/blob/{blob_id}/like/toggle"), Some(&bob))).await;
    assert_eq!(reply.body["liked"], false);

    let reply = send(&app, get(&format!("/blob/{blob_id}"), Some(&alice))).await;
    assert_eq!(reply.body["blob"]["likes"], 0);
    assert_eq!(reply.body["blob"]["owned"], true);

    let reply = send(&app, get(&format!("/users/{alice_id}/follow"), Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, get("/overview", Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let feed = reply.body["overview"].as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["id"], blob_id);

    let reply = send(&app, get(&format!("/users/{alice_id}/followers"), Some(&bob))).await;
    let followers = reply.body["users"].as_array().unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["id"], bob_id);

    let reply = send(&app, get(&format!("/users/{alice_id}"), Some(&bob))).await;
    assert_eq!(reply.body["data"]["follows"], true);
    assert_eq!(reply.body["data"]["followers"], 1);

    let reply = send(&app, get(&format!("/users/{alice_id}/unfollow"), Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = send(&app, get("/overview", Some(&bob))).await;
    assert!(reply.body["overview"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn login_sets_cookie_and_bearer_and_hides_password() {
    let app = app();
    register(&app, "alice", "password").await;

    let reply = send(
        &app,
        post(
            "/login",
            None,
            json!({ "username": "alice", "password": "password" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["error"], false);
    assert_eq!(reply.body["code"], 200);
    assert_eq!(reply.body["user"]["username"], "alice");
    assert_eq!(reply.body["user"]["password"], "-hidden-");

    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("JWT="));
    assert!(set_cookie.contains("HttpOnly"));

    let bearer = reply.headers[header::AUTHORIZATION].to_str().unwrap();
    assert!(bearer.starts_with("Bearer "));

    let request = Request::builder()
        .uri("/overview")
        .header(header::AUTHORIZATION, bearer)
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, request).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_unauthorized() {
    let app = app();
    register(&app, "alice", "password").await;

    for (username, password) in [("alice", "nope"), ("nobody", "password")] {
        let reply = send(
            &app,
            post(
                "/login",
                None,
                json!({ "username": username, "password": password }),
            ),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["error"], true);
        assert!(reply.headers.get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn duplicate_registration_is_internal_error() {
    let app = app();
    assert_eq!(
        register(&app, "alice", "password").await.status,
        StatusCode::CREATED
    );

    let reply = register(&app, "alice", "other").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body["code"], 500);
    assert_eq!(reply.body["error"], true);
    assert_eq!(reply.body["msg"], "Internal server error: user already exists");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let reply = send(&app, request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["msg"].as_str().unwrap().starts_with("Invalid json"));
}

#[tokio::test]
async fn only_the_owner_modifies_or_deletes() {
    let app = app();
    let (alice, _) = sign_up(&app, "alice").await;
    let (bob, _) = sign_up(&app, "bob").await;
    let blob_id = add_blob(&app, &alice, "original").await;

    let reply = send(
        &app,
        post(
            &format!("/blob/{blob_id}/modify"),
            Some(&bob),
            json!({ "content": "hijacked" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        reply.body["msg"],
        "You are not authorized to modify this blob, only the owner can modify it"
    );

    let reply = send(&app, get(&format!("/blob/{blob_id}/delete"), Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(&app, get(&format!("/blob/{blob_id}"), None)).await;
    assert_eq!(reply.body["blob"]["content"], "original");

    let reply = send(
        &app,
        post(
            &format!("/blob/{blob_id}/modify"),
            Some(&alice),
            json!({ "content": "original" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(
        &app,
        post(
            &format!("/blob/{blob_id}/modify"),
            Some(&alice),
            json!({ "content": "" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(
        &app,
        post(
            &format!("/blob/{blob_id}/modify"),
            Some(&alice),
            json!({ "content": "edited" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = send(&app, get(&format!("/blob/{blob_id}"), None)).await;
    assert_eq!(reply.body["blob"]["content"], "edited");

    let reply = send(&app, get(&format!("/blob/{blob_id}/delete"), Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = send(&app, get(&format!("/blob/{blob_id}"), None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let app = app();
    let (alice, _) = sign_up(&app, "alice").await;

    let reply = send(&app, get("/blob/999", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["msg"], "Blob not found");

    let reply = send(&app, get("/blob/abc", None)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["msg"], "Invalid blob id");

    let reply = send(&app, get("/blob/999/like/toggle", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&app, get("/users/999", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["msg"], "User not found");
}

#[tokio::test]
async fn api_routes_without_session_are_unauthorized() {
    let app = app();

    let reply = send(&app, get("/overview", None)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["msg"], "No JWT cookie found");

    let reply = send(&app, get("/overview", Some("JWT=garbage"))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["msg"], "Invalid JWT");
}

#[tokio::test]
async fn page_routes_redirect_to_login_without_session() {
    let app = app();

    for uri in ["/", "/search", "/users/page/1"] {
        let reply = send(&app, get(uri, None)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(reply.headers[header::LOCATION], "/login");
    }
}

#[tokio::test]
async fn home_page_renders_for_session_user() {
    let app = app();
    let (alice, alice_id) = sign_up(&app, "alice").await;

    let reply = send(&app, get("/", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.text.contains("Hello alice"));
    assert!(reply.text.contains(&format!("/users/page/{alice_id}")));

    let reply = send(&app, get("/users/page/abc", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = app();

    let (alice, _) = sign_up(&app, "alice").await;

    let reply = send(&app, get("/logout", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.headers[header::LOCATION], "/login");
    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("JWT=;"));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("Path=/"));

    let reply = send(&app, get("/logout", None)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn token_outlives_account_deletion() {
    let app = app();
    let (alice, alice_id) = sign_up(&app, "alice").await;
    add_blob(&app, &alice, "soon gone").await;

    let reply = send(&app, get("/users/delete", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::OK);

    // No revocation: the session keeps authenticating until it expires.
    let reply = send(&app, get("/overview", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, get(&format!("/users/{alice_id}"), Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&app, get("/blob/1", None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_account_cannot_follow_or_like() {
    let app = app();
    let (alice, alice_id) = sign_up(&app, "alice").await;
    let (carol, _) = sign_up(&app, "carol").await;
    let blob_id = add_blob(&app, &alice, "still here").await;

    let reply = send(&app, get("/users/delete", Some(&carol))).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, get(&format!("/users/{alice_id}/follow"), Some(&carol))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    for action in ["add", "toggle"] {
        let uri = format!("/blob/{blob_id}/like/{action}");
        let reply = send(&app, get(&uri, Some(&carol))).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(reply.body["error"], true);
    }

    let reply = send(&app, get(&format!("/users/{alice_id}"), Some(&alice))).await;
    assert_eq!(reply.body["data"]["followers"], 0);
    let reply = send(&app, get(&format!("/users/{alice_id}/followers"), Some(&alice))).await;
    assert!(reply.body["users"].as_array().unwrap().is_empty());

    let reply = send(&app, get(&format!("/blob/{blob_id}"), None)).await;
    assert_eq!(reply.body["blob"]["likes"], 0);
}

#[tokio::test]
async fn user_blobs_are_listed_newest_first() {
    let app = app();
    let (alice, alice_id) = sign_up(&app, "alice").await;
    let first = add_blob(&app, &alice, "first").await;
    let second = add_blob(&app, &alice, "second").await;

    let reply = send(&app, get(&format!("/users/{alice_id}/blobs"), Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let ids: Vec<i64> = reply.body["blobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|blob| blob["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);

    let reply = send(&app, get("/users/999/blobs", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["msg"], "User not found");

    let reply = send(&app, get("/users/abc/blobs", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn modify_user_replaces_description() {
    let app = app();
    let (alice, alice_id) = sign_up(&app, "alice").await;

    let reply = send(
        &app,
        post("/users/modify", Some(&alice), json!({ "content": "new bio" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["msg"], "content modified successfully");

    let reply = send(&app, get(&format!("/users/{alice_id}"), Some(&alice))).await;
    assert_eq!(reply.body["data"]["description"], "new bio");
}

#[tokio::test]
async fn like_add_and_remove() {
    let app = app();
    let (alice, _) = sign_up(&app, "alice").await;
    let (bob, _) = sign_up(&app, "bob").await;
    let blob_id = add_blob(&app, &alice, "likeable").await;

    for _ in 0..2 {
        let reply = send(&app, get(&format!("/blob/{blob_id}/like/add"), Some(&bob))).await;
        assert_eq!(reply.status, StatusCode::OK);
    }
    let reply = send(&app, get(&format!("/blob/{blob_id}"), Some(&bob))).await;
    assert_eq!(reply.body["blob"]["likes"], 2);
    assert_eq!(reply.body["blob"]["liked"], true);

    let reply = send(&app, get(&format!("/blob/{blob_id}/like/remove"), Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = send(&app, get(&format!("/blob/{blob_id}"), Some(&bob))).await;
    assert_eq!(reply.body["blob"]["likes"], 0);
    assert_eq!(reply.body["blob"]["liked"], false);

    for action in ["add", "remove"] {
        let reply = send(&app, get(&format!("/blob/999/like/{action}"), Some(&bob))).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body["msg"], "Blob not found");
    }
}

#[tokio::test]
async fn following_lists_followed_users() {
    let app = app();
    let (_, alice_id) = sign_up(&app, "alice").await;
    let (bob, bob_id) = sign_up(&app, "bob").await;

    send(&app, get(&format!("/users/{alice_id}/follow"), Some(&bob))).await;

    let reply = send(&app, get(&format!("/users/{bob_id}/following"), Some(&bob))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let following = reply.body["users"].as_array().unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0]["id"], alice_id);
    assert_eq!(following[0]["username"], "alice");

    let reply = send(&app, get(&format!("/users/{bob_id}"), Some(&bob))).await;
    assert_eq!(reply.body["data"]["following"], 1);
}

#[tokio::test]
async fn unique_policy_stores_each_relation_once() {
    let mut config = AppConfig::new("integration-secret");
    config.relation_policy = RelationPolicy::Unique;
    let app = app_with(config);
    let (alice, alice_id) = sign_up(&app, "alice").await;
    let (bob, _) = sign_up(&app, "bob").await;
    let blob_id = add_blob(&app, &alice, "once").await;

    for _ in 0..2 {
        let reply = send(&app, get(&format!("/blob/{blob_id}/like/add"), Some(&bob))).await;
        assert_eq!(reply.status, StatusCode::OK);
        let reply = send(&app, get(&format!("/users/{alice_id}/follow"), Some(&bob))).await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    let reply = send(&app, get(&format!("/blob/{blob_id}"), None)).await;
    assert_eq!(reply.body["blob"]["likes"], 1);
    let reply = send(&app, get(&format!("/users/{alice_id}"), Some(&bob))).await;
    assert_eq!(reply.body["data"]["followers"], 1);
    let reply = send(&app, get(&format!("/users/{alice_id}/followers"), Some(&bob))).await;
    assert_eq!(reply.body["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_excludes_the_requester() {
    let app = app();
    let (alice, _) = sign_up(&app, "alice").await;
    sign_up(&app, "alicia").await;
    sign_up(&app, "bob").await;

    let reply = send(&app, get("/users/search/ali", Some(&alice))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let users = reply.body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "alicia");
    assert_eq!(users[0]["password"], "-hidden-");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let reply = send(&app, get("/health/live", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ok");
}
