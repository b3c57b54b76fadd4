//! Marquee
//!
//! Server-rendered media discovery over the TMDB metadata API.
//! This library exposes modules for use in integration tests.

use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod response;
pub mod services;
pub mod session;
pub mod static_files;
pub mod views;

use config::Config;
use error::{AppError, Result};
use services::{EmbedResolver, TmdbClient};
use session::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tmdb_client: Option<Arc<TmdbClient>>,
    pub embed: Arc<EmbedResolver>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, tmdb_client: Option<Arc<TmdbClient>>) -> Result<Self> {
        let embed = EmbedResolver::from_config(&config.embed)?;
        let sessions = SessionStore::from_config(&config.session);

        Ok(Self {
            config: Arc::new(config),
            tmdb_client,
            embed: Arc::new(embed),
            sessions: Arc::new(sessions),
        })
    }

    /// Get a reference to the TMDB client, if configured.
    pub fn tmdb_client(&self) -> Option<&TmdbClient> {
        self.tmdb_client.as_deref()
    }

    /// The TMDB client, or an upstream error when no API key was configured.
    pub fn tmdb(&self) -> Result<&TmdbClient> {
        self.tmdb_client()
            .ok_or_else(|| AppError::Upstream("TMDB client not configured".to_string()))
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
}

pub async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Marquee is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the complete application router.
///
/// Shared by `main` and the integration tests; middleware layers are added by the caller.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/hero", get(api::hero::get_hero))
        .route("/catalog/:section", get(api::catalog::get_catalog))
        .route("/collections", get(api::collections::list_collections))
        .route("/embed/:id", get(api::embed::get_embed))
        .route("/search", get(api::search::search));

    Router::new()
        // Static assets (CSS, JS)
        .route("/static/*path", get(static_files::serve_static))
        .route("/health", get(health_check))
        // HTMX HTML routes (served at root)
        .merge(views::routes())
        .nest("/api", api_routes)
        .fallback(views::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn offline_router() -> Router {
        let state = AppState::new(Config::default(), None).unwrap();
        build_router(state)
    }

    #[tokio::test]
    async fn test_health_route() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = offline_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fallback_renders_html_not_found() {
        let request = Request::builder()
            .uri("/definitely/missing")
            .body(Body::empty())
            .unwrap();
        let response = offline_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_unknown_catalog_section_is_json_not_found() {
        let request = Request::builder()
            .uri("/api/catalog/radio")
            .body(Body::empty())
            .unwrap();
        let response = offline_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, "application/json");
    }

    #[test]
    fn test_missing_client_is_upstream_error() {
        let state = AppState::new(Config::default(), None).unwrap();
        assert!(matches!(state.tmdb(), Err(AppError::Upstream(_))));
    }
}
