//! Collections overview and detail pages.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Response},
};

use crate::api::collections::{load_collections, CollectionsQuery};
use crate::discovery::Grouping;
use crate::AppState;

use super::utils::{image, CardView};

#[derive(Template)]
#[template(path = "pages/collections.html")]
pub struct CollectionsTemplate {
    pub active_page: String,
    pub query: String,
    pub collections: Vec<CollectionCard>,
    pub total_pages: u32,
    pub total_results: u32,
}

#[derive(Template)]
#[template(path = "pages/collection_detail.html")]
pub struct CollectionDetailTemplate {
    pub active_page: String,
    pub name: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub parts: Vec<CardView>,
}

pub struct CollectionCard {
    pub href: String,
    pub name: String,
    pub poster_url: Option<String>,
    pub part_count: usize,
}

impl CollectionCard {
    fn new(state: &AppState, grouping: &Grouping) -> Self {
        Self {
            href: format!("/collections/{}", grouping.id),
            name: grouping.name.clone(),
            poster_url: image(state, grouping.poster_path.as_deref(), "w500"),
            part_count: grouping.parts.len(),
        }
    }
}

/// GET /collections
pub async fn list(State(state): State<AppState>, Query(query): Query<CollectionsQuery>) -> impl IntoResponse {
    let response = load_collections(&state).await.filtered(query.q.as_deref());

    CollectionsTemplate {
        active_page: "collections".to_string(),
        query: query.q.unwrap_or_default(),
        collections: response
            .collections
            .iter()
            .map(|g| CollectionCard::new(&state, g))
            .collect(),
        total_pages: response.total_pages,
        total_results: response.total_results,
    }
}

/// GET /collections/:id
pub async fn detail(State(state): State<AppState>, Path(id): Path<i64>, uri: Uri) -> Response {
    let collection = match state.tmdb() {
        Ok(client) => client.get_collection(id).await,
        Err(e) => Err(e),
    };

    let grouping = match collection {
        Ok(collection) => Grouping::from(collection),
        Err(e) => {
            tracing::warn!(collection_id = id, error = %e, "Collection lookup failed");
            return super::not_found(uri).await.into_response();
        }
    };

    CollectionDetailTemplate {
        active_page: "collections".to_string(),
        name: grouping.name.clone(),
        overview: grouping.overview.clone().unwrap_or_default(),
        poster_url: image(&state, grouping.poster_path.as_deref(), "w500"),
        backdrop_url: image(&state, grouping.backdrop_path.as_deref(), "original"),
        parts: CardView::list(&state, &grouping.parts),
    }
    .into_response()
}
