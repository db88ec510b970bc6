// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request bodies and the client-facing views of stored rows. All types
//! derive `ToSchema` for the OpenAPI document.
//!
//! ## Password scrubbing
//!
//! [`UserView`] is the only way a user leaves the server. Building one from a
//! [`StoredUser`] always replaces the password hash with [`HIDDEN_PASSWORD`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{StoredBlob, StoredUser};

/// Placeholder returned instead of a password hash.
pub const HIDDEN_PASSWORD: &str = "-hidden-";

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /login` and `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST /blob/add`, `POST /blob/{id}/modify` and `POST /users/modify`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentRequest {
    pub content: String,
}

// =============================================================================
// Views
// =============================================================================

/// A user as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    /// Always `-hidden-`.
    pub password: String,
    pub description: String,
    /// Likes this user has given.
    pub likes: i64,
    pub followers: i64,
    pub following: i64,
    /// Whether the requester follows this user.
    pub follows: bool,
}

impl From<StoredUser> for UserView {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            password: HIDDEN_PASSWORD.to_string(),
            description: user.description,
            likes: user.likes_count,
            followers: user.followers_count,
            following: user.following_count,
            follows: user.follows,
        }
    }
}

/// A blob as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BlobView {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub added_date: DateTime<Utc>,
    pub likes: i64,
    /// Whether the requester has liked this blob.
    pub liked: bool,
    /// Whether the requester owns this blob.
    pub owned: bool,
}

impl From<StoredBlob> for BlobView {
    fn from(blob: StoredBlob) -> Self {
        Self {
            id: blob.id,
            user_id: blob.user_id,
            username: blob.username,
            content: blob.content,
            added_date: blob.added_date,
            likes: blob.likes,
            liked: blob.liked,
            owned: blob.owned,
        }
    }
}

/// Convert a list of stored users into scrubbed views.
pub fn user_views(users: Vec<StoredUser>) -> Vec<UserView> {
    users.into_iter().map(UserView::from).collect()
}

/// Convert a list of stored blobs into views.
pub fn blob_views(blobs: Vec<StoredBlob>) -> Vec<BlobView> {
    blobs.into_iter().map(BlobView::from).collect()
}
