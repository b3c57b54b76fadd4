//! HTML views for HTMX frontend
//!
//! This module contains route handlers that render Askama templates
//! for the HTMX-powered frontend.

pub mod catalog;
pub mod collections;
pub mod hero;
pub mod home;
pub mod search;
pub mod sse;
pub mod tv;
pub mod utils;
pub mod watch;

use askama::Template;
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::AppState;

#[derive(Template)]
#[template(path = "pages/404.html")]
pub struct NotFoundTemplate {
    pub path: String,
    pub active_page: String,
}

/// 404 handler
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            path: uri.path().to_string(),
            active_page: String::new(),
        },
    )
}

/// Build the HTML routes for the frontend
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::page))
        // Catalog sections; grids are the HTMX paging targets
        .route("/movies", get(catalog::movies))
        .route("/movies/grid", get(catalog::movies_grid))
        .route("/tv", get(catalog::tv))
        .route("/tv/grid", get(catalog::tv_grid))
        .route("/anime", get(catalog::anime))
        .route("/anime/grid", get(catalog::anime_grid))
        .route("/collections", get(collections::list))
        .route("/collections/:id", get(collections::detail))
        .route("/tv/:id", get(tv::detail))
        .route("/tv/:id/season/:season", get(tv::season))
        .route("/search", get(search::page))
        .route("/watch/:id", get(watch::page))
        // Hero carousel commands (return the hero fragment)
        .route("/hero/next", post(hero::next))
        .route("/hero/previous", post(hero::previous))
        .route("/hero/select/:index", post(hero::select))
        // SSE endpoints
        .route("/sse/hero", get(sse::hero_stream))
}
