// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blob endpoints.
//!
//! Modify and delete load the blob first and run it through
//! [`OwnershipCheck`] before touching it. Likes are always recorded for the
//! session user, never for an id taken from the request.

use axum::extract::{Path, State};

use crate::{
    api::response::{parse_id, Envelope, JsonBody},
    auth::{Auth, OptionalAuth},
    error::ApiError,
    models::{BlobView, ContentRequest},
    state::AppState,
    storage::{OwnershipCheck, StorageError},
};

const INVALID_BLOB_ID: &str = "Invalid blob id";
const BLOB_NOT_FOUND: &str = "Blob not found";
const MODIFY_FORBIDDEN: &str =
    "You are not authorized to modify this blob, only the owner can modify it";
const DELETE_FORBIDDEN: &str =
    "You are not authorized to delete this blob, only the owner can delete it";

/// Map a failed lookup-and-ownership check onto the blob responses.
fn owner_error(forbidden: &'static str) -> impl Fn(StorageError) -> ApiError {
    move |e| match e {
        StorageError::NotFound(_) => ApiError::not_found(BLOB_NOT_FOUND),
        StorageError::PermissionDenied { user_id, resource } => {
            tracing::warn!(user_id, %resource, "ownership check failed");
            ApiError::forbidden(forbidden)
        }
        other => ApiError::from(other),
    }
}

/// Get a blob. Public; `liked` and `owned` are set when a session is present.
#[utoipa::path(
    get,
    path = "/blob/{id}",
    tag = "Blobs",
    params(("id" = i64, Path, description = "Blob ID")),
    responses(
        (status = 200, description = "Envelope key `blob` holds the blob", body = BlobView),
        (status = 400, description = "Invalid blob id"),
        (status = 404, description = "Blob not found")
    )
)]
pub async fn get_blob(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_BLOB_ID)?;
    let requester = user.map(|u| u.user_id);
    let blob = state
        .blobs()
        .get(id, requester)
        .map_err(ApiError::not_found_as(BLOB_NOT_FOUND))?;

    Ok(Envelope::ok("Successfully retrieved blob").with("blob", BlobView::from(blob)))
}

/// Publish a blob as the requester.
#[utoipa::path(
    post,
    path = "/blob/add",
    tag = "Blobs",
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Envelope key `blob` holds the new blob", body = BlobView),
        (status = 400, description = "Invalid JSON body or empty content"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn add_blob(
    Auth(user): Auth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ContentRequest>,
) -> Result<Envelope, ApiError> {
    let blobs = state.blobs();
    let id = blobs.create(user.user_id, &body.content)?;
    let blob = blobs.get(id, Some(user.user_id))?;
    tracing::info!(user_id = user.user_id, blob_id = id, "blob added");

    Ok(Envelope::ok("Successfully added blob").with("blob", BlobView::from(blob)))
}

/// Replace the content of a blob the requester owns.
#[utoipa::path(
    post,
    path = "/blob/{id}/modify",
    tag = "Blobs",
    params(("id" = i64, Path, description = "Blob ID")),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Blob modified"),
        (status = 400, description = "Invalid id, empty or unchanged content"),
        (status = 401, description = "No valid session, or requester is not the owner"),
        (status = 404, description = "Blob not found")
    )
)]
pub async fn modify_blob(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ContentRequest>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_BLOB_ID)?;
    let blobs = state.blobs();
    blobs
        .get(id, Some(user.user_id))
        .verify_owner(&user)
        .map_err(owner_error(MODIFY_FORBIDDEN))?;

    blobs
        .modify(id, &body.content)
        .map_err(ApiError::not_found_as(BLOB_NOT_FOUND))?;
    tracing::info!(user_id = user.user_id, blob_id = id, "blob modified");

    Ok(Envelope::ok("Successfully modified blob"))
}

/// Delete a blob the requester owns.
#[utoipa::path(
    get,
    path = "/blob/{id}/delete",
    tag = "Blobs",
    params(("id" = i64, Path, description = "Blob ID")),
    responses(
        (status = 200, description = "Blob deleted"),
        (status = 400, description = "Invalid blob id"),
        (status = 401, description = "No valid session, or requester is not the owner"),
        (status = 404, description = "Blob not found")
    )
)]
pub async fn delete_blob(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_BLOB_ID)?;
    let blobs = state.blobs();
    blobs
        .get(id, Some(user.user_id))
        .verify_owner(&user)
        .map_err(owner_error(DELETE_FORBIDDEN))?;

    blobs
        .delete(id)
        .map_err(ApiError::not_found_as(BLOB_NOT_FOUND))?;
    tracing::info!(user_id = user.user_id, blob_id = id, "blob deleted");

    Ok(Envelope::ok("Successfully deleted blob"))
}

/// Like a blob as the requester.
#[utoipa::path(
    get,
    path = "/blob/{id}/like/add",
    tag = "Blobs",
    params(("id" = i64, Path, description = "Blob ID")),
    responses(
        (status = 200, description = "Like recorded"),
        (status = 400, description = "Invalid blob id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Blob not found, or the session account was deleted")
    )
)]
pub async fn like_blob(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_BLOB_ID)?;
    let blobs = state.blobs();
    blobs
        .get(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(BLOB_NOT_FOUND))?;
    blobs.like(id, user.user_id)?;

    Ok(Envelope::ok("Successfully liked blob"))
}

/// Remove the requester's like from a blob.
#[utoipa::path(
    get,
    path = "/blob/{id}/like/remove",
    tag = "Blobs",
    params(("id" = i64, Path, description = "Blob ID")),
    responses(
        (status = 200, description = "Like removed"),
        (status = 400, description = "Invalid blob id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Blob not found")
    )
)]
pub async fn unlike_blob(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_BLOB_ID)?;
    let blobs = state.blobs();
    blobs
        .get(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(BLOB_NOT_FOUND))?;
    blobs.unlike(id, user.user_id)?;

    Ok(Envelope::ok("Successfully unliked blob"))
}

/// Flip the requester's like on a blob. Envelope key `liked` holds the new state.
#[utoipa::path(
    get,
    path = "/blob/{id}/like/toggle",
    tag = "Blobs",
    params(("id" = i64, Path, description = "Blob ID")),
    responses(
        (status = 200, description = "Like toggled"),
        (status = 400, description = "Invalid blob id"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Blob not found, or the session account was deleted")
    )
)]
pub async fn toggle_like(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope, ApiError> {
    let id = parse_id(&id, INVALID_BLOB_ID)?;
    let blobs = state.blobs();
    blobs
        .get(id, Some(user.user_id))
        .map_err(ApiError::not_found_as(BLOB_NOT_FOUND))?;
    let liked = blobs.toggle_like(id, user.user_id)?;

    Ok(Envelope::ok("Successfully toggled like blob").with("liked", liked))
}
