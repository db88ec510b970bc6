// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response::Envelope;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// No `JWT` cookie and no bearer header
    MissingSession,
    /// Token is malformed, has a bad signature or a wrong issuer
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Token could not be signed
    SigningFailed(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSession => "missing_session",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::SigningFailed(_) => "signing_failed",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSession | AuthError::InvalidToken | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::SigningFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "No JWT cookie found"),
            AuthError::InvalidToken => write!(f, "Invalid JWT"),
            AuthError::TokenExpired => write!(f, "JWT has expired"),
            AuthError::SigningFailed(msg) => write!(f, "Internal server error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error_code = self.error_code(), "request rejected by auth");
        Envelope::error(self.status_code(), self.to_string()).into_response()
    }
}
