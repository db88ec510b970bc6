// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints: profiles, search, follow relations and the overview feed.
//!
//! Every route here needs a session. Users are always returned as
//! [`UserView`], which hides the password hash.

use axum::extract::{Path, State};

use crate::{
    api::response::{parse_id, Envelope, JsonBody},
    auth::Auth,
    error::ApiError,
    models::{blob_views, user_views, ContentRequest, UserView},
    state::AppState,
};

const INVALID_USER_ID: &str = "Invalid user id";
const USER_NOT_FOUND: &str = "User not found";

/// Blobs of the accounts the requester follows, newest first.
#[utoipa::path(
    get,
    path = "/overview",
    tag = "Users",
    responses(
        (status = 200, description = "Envelope key `overview` holds the feed"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn overview(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Envelope, ApiError> {
    let feed = state.users().overview(user.user_id)?;
    Ok(Envelope::ok("Successfully retrieved overview").with("overview", blob_views(feed)))
}

/// Get a user profile with counts relative to the requester.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Envelope key `data` holds the user", body = UserView),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let found = state
        .users()
        .get_by_id(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;

    Ok(Envelope::ok("Successfully retrieved user").with("data", UserView::from(found)))
}

/// Blobs authored by a user, newest first.
#[utoipa::path(
    get,
    path = "/users/{id}/blobs",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Envelope key `blobs` holds the list"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_blobs(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let blobs = state
        .users()
        .blobs_of(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;

    Ok(Envelope::ok("Successfully retrieved blobs").with("blobs", blob_views(blobs)))
}

/// Users whose name contains `query`, excluding the requester.
#[utoipa::path(
    get,
    path = "/users/search/{query}",
    tag = "Users",
    params(("query" = String, Path, description = "Username substring")),
    responses(
        (status = 200, description = "Envelope key `users` holds the matches"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn search_users(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Envelope, ApiError> {
    let users = state.users().search(&query, user.user_id)?;
    tracing::debug!(query = %query, results = users.len(), "user search");

    Ok(Envelope::ok("Successfully retrieved users").with("users", user_views(users)))
}

/// Users following `id`.
#[utoipa::path(
    get,
    path = "/users/{id}/followers",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Envelope key `users` holds the followers"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found")
    )
)]
pub async fn followers(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let users = state
        .users()
        .followers(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;

    Ok(Envelope::ok("Successfully retrieved followers").with("users", user_views(users)))
}

/// Users that `id` follows.
#[utoipa::path(
    get,
    path = "/users/{id}/following",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Envelope key `users` holds the followed accounts"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found")
    )
)]
pub async fn following(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let users = state
        .users()
        .following(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;

    Ok(Envelope::ok("Successfully retrieved following").with("users", user_views(users)))
}

/// Follow a user as the requester.
#[utoipa::path(
    get,
    path = "/users/{id}/follow",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID to follow")),
    responses(
        (status = 200, description = "Followed"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "User not found")
    )
)]
pub async fn follow(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    state
        .users()
        .follow(user.user_id, id)
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;
    tracing::info!(follower = user.user_id, followed = id, "user followed");

    Ok(Envelope::ok("Successfully followed user"))
}

/// Stop following a user.
#[utoipa::path(
    get,
    path = "/users/{id}/unfollow",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID to unfollow")),
    responses(
        (status = 200, description = "Unfollowed"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn unfollow(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    state.users().unfollow(user.user_id, id)?;
    tracing::info!(follower = user.user_id, followed = id, "user unfollowed");

    Ok(Envelope::ok("Successfully unfollowed user"))
}

/// Replace the requester's description with `content`.
#[utoipa::path(
    post,
    path = "/users/modify",
    tag = "Users",
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Description updated"),
        (status = 400, description = "Invalid JSON body"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn modify_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ContentRequest>,
) -> Result<Envelope, ApiError> {
    state
        .users()
        .update_description(user.user_id, &body.content)
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;

    Ok(Envelope::ok("content modified successfully"))
}

/// Delete the requester's account with its blobs, likes and follows.
///
/// The session token stays valid until it expires.
#[utoipa::path(
    get,
    path = "/users/delete",
    tag = "Users",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Account already gone")
    )
)]
pub async fn delete_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Envelope, ApiError> {
    state
        .users()
        .delete(user.user_id)
        .map_err(ApiError::not_found_as(USER_NOT_FOUND))?;
    tracing::info!(user_id = user.user_id, "user deleted");

    Ok(Envelope::ok("user deleted successfully"))
}
