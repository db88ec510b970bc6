// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Readiness report for the blob server.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// `ok` when every check passes, `degraded` otherwise.
    pub status: String,
    pub checks: HealthChecks,
}

/// Per-component results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub service: String,
    /// Result of a trivial query against the database.
    pub database: String,
    /// Whether the page template directory exists.
    pub pages: String,
}

/// Liveness body.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_database(state: &AppState) -> String {
    match state.db.health_check() {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            "unavailable".to_string()
        }
    }
}

fn check_pages(state: &AppState) -> String {
    if state.config.pages_dir.is_dir() {
        "ok".to_string()
    } else {
        "missing".to_string()
    }
}

/// Combined health report.
///
/// Returns 200 if the database answers, 503 otherwise. A missing page
/// directory only degrades the HTML routes and is reported but not fatal.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable", body = ReadyResponse),
        (status = 503, description = "Database unreachable", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let database = check_database(&state);
    let pages = check_pages(&state);
    let db_ok = database == "ok";

    let response = ReadyResponse {
        status: if db_ok && pages == "ok" { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            database,
            pages,
        },
    };

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Answers 200 while the process can serve requests. Touches neither the
/// database nor the page directory.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Same report as `/health`, for orchestrators that check readiness separately.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to serve", body = ReadyResponse),
        (status = 503, description = "Database unreachable", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
