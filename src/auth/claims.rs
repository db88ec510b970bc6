// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and authenticated user representation.

use serde::{Deserialize, Serialize};

/// Issuer stamped into every session token.
pub const SESSION_ISSUER: &str = "blob-server";

/// Claims carried by a session token.
///
/// The user id is serialized as `ID` so tokens stay readable by clients that
/// decode the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub username: String,

    #[serde(rename = "ID")]
    pub user_id: i64,

    /// Expiration timestamp (Unix seconds)
    pub exp: i64,

    #[serde(default)]
    pub iss: String,
}

impl SessionClaims {
    pub fn new(username: impl Into<String>, user_id: i64, expires_at: i64) -> Self {
        Self {
            username: username.into(),
            user_id,
            exp: expires_at,
            iss: SESSION_ISSUER.to_string(),
        }
    }
}

/// Authenticated user information extracted from a verified session.
///
/// This is the type handlers receive from [`super::Auth`] and the page
/// middleware stores in request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Database id of the account.
    pub user_id: i64,

    pub username: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified session claims.
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            expires_at: claims.exp,
        }
    }
}
