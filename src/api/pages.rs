// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTML page routes.
//!
//! Templates are plain HTML files under `pages_dir` with `{{name}}`
//! placeholders. Values are HTML-escaped before substitution. A template
//! that cannot be read answers `503` with the JSON envelope.
//!
//! `/`, `/search` and `/users/page/{id}` sit behind
//! [`crate::auth::require_page_session`], so the `Auth` extractor here only
//! reads the user the middleware attached.

use axum::{
    extract::{Path, State},
    response::Html,
};

use crate::{
    api::response::parse_id,
    auth::Auth,
    error::ApiError,
    state::AppState,
};

/// Substitute `{{key}}` placeholders in one pass. Unknown keys are left as is.
pub fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let key = after[..end].trim();
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(&html_escape::encode_safe(value)),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

async fn render(
    state: &AppState,
    name: &str,
    values: &[(&str, String)],
) -> Result<Html<String>, ApiError> {
    let path = state.config.pages_dir.join(name);
    let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "page template unavailable");
        ApiError::service_unavailable(format!("error, reason: {e}"))
    })?;

    Ok(Html(fill_template(&template, values)))
}

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state, "login.html", &[]).await
}

pub async fn register_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state, "register.html", &[]).await
}

pub async fn search_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state, "search.html", &[]).await
}

/// Home page of the session user.
pub async fn home_page(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let me = state
        .users()
        .get_by_id(user.user_id, None)
        .map_err(ApiError::not_found_as("User not found"))?;

    render(
        &state,
        "home.html",
        &[
            ("username", user.username),
            ("id", user.user_id.to_string()),
            ("bio", me.description),
        ],
    )
    .await
}

/// Profile page of any user, seen by the session user.
pub async fn user_page(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = parse_id(&id, "Invalid id")?;
    let users = state.users();
    let profile = users
        .get_by_id(id, Some(user.user_id))
        .map_err(ApiError::not_found_as("User not found"))?;
    let blob_count = users.blobs_of(id, Some(user.user_id))?.len();

    let follows_button = if profile.id == user.user_id {
        "remove"
    } else if profile.follows {
        "Un-Follow"
    } else {
        "Follow"
    };

    render(
        &state,
        "user.html",
        &[
            ("username", profile.username),
            ("id", profile.id.to_string()),
            ("follows_button", follows_button.to_string()),
            ("likes", profile.likes_count.to_string()),
            ("blobs", blob_count.to_string()),
            ("followers", profile.followers_count.to_string()),
            ("following", profile.following_count.to_string()),
            ("description", profile.description),
        ],
    )
    .await
}
