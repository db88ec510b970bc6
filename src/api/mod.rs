// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware, routing::get, routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_page_session,
    models::{BlobView, ContentRequest, Credentials, UserView},
    state::AppState,
    storage::RelationPolicy,
};

pub mod blobs;
pub mod health;
pub mod pages;
pub mod response;
pub mod session;
pub mod users;

pub fn router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::home_page))
        .route("/search", get(pages::search_page))
        .route("/users/page/{id}", get(pages::user_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_page_session,
        ));

    let api_routes = Router::new()
        .route("/login", get(pages::login_page).post(session::login))
        .route("/register", get(pages::register_page).post(session::register))
        .route("/logout", get(session::logout))
        .route("/overview", get(users::overview))
        .route("/users/modify", post(users::modify_user))
        .route("/users/delete", get(users::delete_user))
        .route("/users/search/{query}", get(users::search_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/blobs", get(users::user_blobs))
        .route("/users/{id}/follow", get(users::follow))
        .route("/users/{id}/unfollow", get(users::unfollow))
        .route("/users/{id}/followers", get(users::followers))
        .route("/users/{id}/following", get(users::following))
        .route("/blob/add", post(blobs::add_blob))
        .route("/blob/{id}", get(blobs::get_blob))
        .route("/blob/{id}/modify", post(blobs::modify_blob))
        .route("/blob/{id}/delete", get(blobs::delete_blob))
        .route("/blob/{id}/like/add", get(blobs::like_blob))
        .route("/blob/{id}/like/remove", get(blobs::unlike_blob))
        .route("/blob/{id}/like/toggle", get(blobs::toggle_like))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        session::login,
        session::register,
        session::logout,
        users::overview,
        users::get_user,
        users::user_blobs,
        users::search_users,
        users::followers,
        users::following,
        users::follow,
        users::unfollow,
        users::modify_user,
        users::delete_user,
        blobs::get_blob,
        blobs::add_blob,
        blobs::modify_blob,
        blobs::delete_blob,
        blobs::like_blob,
        blobs::unlike_blob,
        blobs::toggle_like,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Credentials,
            ContentRequest,
            UserView,
            BlobView,
            RelationPolicy,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Session", description = "Login, registration and logout"),
        (name = "Users", description = "Profiles, search, follows and the overview feed"),
        (name = "Blobs", description = "Posts and likes"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let state = AppState::in_memory(AppConfig::new("test-secret")).unwrap();
        let app = router(state);
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_blob_and_user_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/login", "/blob/{id}/like/toggle", "/users/{id}/followers", "/overview"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn openapi_schemas_are_wire_models_only() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["Credentials", "ContentRequest", "UserView", "BlobView"] {
            assert!(schemas.contains_key(name), "missing {name}");
        }
        assert!(!schemas.contains_key("AuthenticatedUser"));
    }
}
