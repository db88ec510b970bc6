// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session middleware for HTML page routes.
//!
//! API routes use the [`super::Auth`] extractor and answer `401`. Page routes
//! are wrapped in [`require_page_session`] instead, which sends the browser
//! to the login page.
//!
//! ```rust,ignore
//! let pages = Router::new()
//!     .route("/", get(home_page))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_page_session,
//!     ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::extractor::authenticate;
use crate::state::AppState;

/// Redirect target for requests without a valid session.
pub const LOGIN_PATH: &str = "/login";

/// Verify the session and attach the user to request extensions.
///
/// Missing or invalid sessions get a `303 See Other` to the login page.
pub async fn require_page_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(path = %request.uri().path(), error = %e, "redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}
