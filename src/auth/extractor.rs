// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "JWT";

/// Find the session token: the `JWT` cookie first, then `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Verify the session carried by `headers`.
pub fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthenticatedUser, AuthError> {
    let token = session_token(headers).ok_or(AuthError::MissingSession)?;
    let claims = state.sessions.verify(&token)?;
    Ok(AuthenticatedUser::from_claims(claims))
}

/// Extractor for authenticated users.
///
/// Rejects with `401` and the JSON envelope when no valid session is present.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Page routes already ran the session middleware
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        authenticate(&parts.headers, state).map(Auth)
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid session is present, instead of rejecting.
/// Public routes use it to compute requester-relative flags.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
