// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, registration and logout.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    api::response::{Envelope, JsonBody},
    auth::{hash_password, middleware::LOGIN_PATH, verify_password, SESSION_COOKIE},
    error::ApiError,
    models::{Credentials, UserView},
    state::AppState,
    storage::StorageError,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// HttpOnly session cookie for the whole site.
fn session_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Log in with username and password.
///
/// On success the session token is set as the `JWT` cookie and mirrored in
/// the `Authorization` response header.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Session",
    request_body = Credentials,
    responses(
        (status = 200, description = "Logged in; envelope key `user` holds the scrubbed user"),
        (status = 400, description = "Invalid JSON body"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Response, ApiError> {
    let user = match state.users().get_by_username(&credentials.username, None) {
        Ok(user) => user,
        Err(StorageError::NotFound(_)) => {
            tracing::info!(username = %credentials.username, "login for unknown user");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&credentials.password, &user.password_hash) {
        tracing::info!(user_id = user.id, "login with wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let (token, _expires_at) = state.sessions.issue_for(&user.username, user.id)?;
    tracing::info!(user_id = user.id, "user logged in");

    let bearer = format!("Bearer {token}");
    Ok((
        jar.add(session_cookie(token, state.sessions.ttl_secs())),
        [(AUTHORIZATION, bearer)],
        Envelope::ok("Successfully logged in").with("user", UserView::from(user)),
    )
        .into_response())
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Session",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid JSON body"),
        (status = 500, description = "Username already taken or database failure")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Envelope, ApiError> {
    let user_id = state
        .users()
        .create(&credentials.username, &hash_password(&credentials.password), "")?;
    tracing::info!(user_id, username = %credentials.username, "user registered");

    Ok(Envelope::success(
        StatusCode::CREATED,
        "successfully registered, you can now login",
    ))
}

/// Clear the session cookie and go back to the login page.
#[utoipa::path(
    get,
    path = "/logout",
    tag = "Session",
    responses(
        (status = 303, description = "Cookie cleared, redirect to /login")
    )
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to(LOGIN_PATH),
    )
}
