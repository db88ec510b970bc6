// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response envelope and request helpers shared by every JSON handler.
//!
//! Every JSON answer, success or failure, has the shape
//! `{"code": <status>, "msg": <text>, "error": <bool>, "<key>": <payload>?}`.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// The `{code, msg, error, <key>?}` response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    #[serde(skip)]
    status: StatusCode,
    pub code: u16,
    pub msg: String,
    pub error: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    fn new(status: StatusCode, msg: impl Into<String>, error: bool) -> Self {
        Self {
            status,
            code: status.as_u16(),
            msg: msg.into(),
            error,
            payload: Map::new(),
        }
    }

    /// `200 OK` success envelope.
    pub fn ok(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, msg, false)
    }

    /// Success envelope with an explicit status.
    pub fn success(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::new(status, msg, false)
    }

    /// Failure envelope.
    pub fn error(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::new(status, msg, true)
    }

    /// Attach a payload under `key`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.payload.insert(key.to_string(), value);
            }
            Err(e) => tracing::error!(key, error = %e, "failed to serialize envelope payload"),
        }
        self
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self)).into_response()
    }
}

/// JSON body extractor whose rejection is an `Invalid json, ...` envelope.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                let reason = match rejection {
                    JsonRejection::JsonDataError(e) => e.body_text(),
                    JsonRejection::JsonSyntaxError(e) => e.body_text(),
                    JsonRejection::MissingJsonContentType(_) => {
                        "expected `Content-Type: application/json`".to_string()
                    }
                    other => other.body_text(),
                };
                Err(ApiError::bad_request(format!("Invalid json, {reason}")))
            }
        }
    }
}

/// Parse an integer path id, answering `400 <message>` otherwise.
pub fn parse_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request(message))
}
