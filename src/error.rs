// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response::Envelope;
use crate::auth::AuthError;
use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Ownership failure. Answers `401`, which is what existing clients expect.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {message}"),
        )
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Map a storage error, using `message` when the entity is missing.
    pub fn not_found_as(message: &'static str) -> impl Fn(StorageError) -> ApiError {
        move |e| match e {
            StorageError::NotFound(_) => ApiError::not_found(message),
            other => ApiError::from(other),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match &e {
            StorageError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            StorageError::Validation(msg) => ApiError::bad_request(msg.clone()),
            // Duplicate registration answers 500 like any other insert failure.
            StorageError::AlreadyExists(_) => ApiError::internal(&e),
            StorageError::PermissionDenied { .. } => ApiError::forbidden(e.to_string()),
            StorageError::Database(inner) => {
                tracing::error!(error = %inner, "database error");
                ApiError::internal(&e)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::new(e.status_code(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::error(self.status, self.message).into_response()
    }
}
