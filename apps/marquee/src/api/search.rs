//! Multi-search over movies and TV.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::discovery::MediaSummary;
use crate::services::tmdb::TmdbMultiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
}

impl SearchQuery {
    /// Trimmed query text, if any.
    pub fn text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub items: Vec<MediaSummary>,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl SearchResponse {
    fn empty(query: &str, page: u32) -> Self {
        Self {
            query: query.to_string(),
            items: Vec::new(),
            page,
            total_pages: 0,
            has_more: false,
        }
    }
}

/// Movie and TV hits for `query`; people are dropped. Failures yield no results.
pub async fn run_search(state: &AppState, query: &SearchQuery) -> SearchResponse {
    let page = query.page.unwrap_or(1).max(1);
    let Some(text) = query.text() else {
        return SearchResponse::empty("", page);
    };
    let Some(client) = state.tmdb_client() else {
        return SearchResponse::empty(text, page);
    };

    match client.search_multi(text, page).await {
        Ok(results) => {
            let total_pages = results.total_pages.min(state.config.catalog.max_total_pages);
            SearchResponse {
                query: text.to_string(),
                items: results
                    .results
                    .into_iter()
                    .filter_map(TmdbMultiResult::into_title)
                    .map(MediaSummary::from)
                    .collect(),
                page,
                total_pages,
                has_more: page < total_pages,
            }
        }
        Err(e) => {
            tracing::warn!(query = %text, error = %e, "Search failed");
            SearchResponse::empty(text, page)
        }
    }
}

/// GET /api/search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    Json(run_search(&state, &query).await)
}
