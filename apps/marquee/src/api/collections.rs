//! Collections discovered from the top-rated movie list.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::discovery::{CollectionScanner, Grouping};
use crate::services::TmdbClient;
use crate::AppState;

/// Used when the collection search count is unavailable.
const FALLBACK_TOTAL_PAGES: u32 = 347;
const FALLBACK_TOTAL_RESULTS: u32 = 6928;

#[derive(Debug, Default, Deserialize)]
pub struct CollectionsQuery {
    /// Case-insensitive name filter over the discovered collections.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<Grouping>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl CollectionsResponse {
    pub fn filtered(mut self, query: Option<&str>) -> Self {
        let needle = query.map(str::trim).filter(|q| !q.is_empty()).map(str::to_lowercase);
        if let Some(needle) = needle {
            self.collections
                .retain(|c| c.name.to_lowercase().contains(&needle));
        }
        self
    }
}

/// Run the scanner and the catalog-wide count.
pub async fn load_collections(state: &AppState) -> CollectionsResponse {
    let Some(client) = state.tmdb_client() else {
        tracing::warn!("TMDB client not configured, no collections to show");
        return CollectionsResponse {
            collections: Vec::new(),
            total_pages: FALLBACK_TOTAL_PAGES,
            total_results: FALLBACK_TOTAL_RESULTS,
        };
    };

    let scanner = CollectionScanner::from_config(&state.config.collections);
    let collections = scanner.scan(client).await;
    let (total_pages, total_results) = collection_totals(client, state.config.catalog.max_total_pages).await;

    CollectionsResponse {
        collections,
        total_pages,
        total_results,
    }
}

/// Size of TMDB's collection catalog, estimated from a broad search.
async fn collection_totals(client: &TmdbClient, max_total_pages: u32) -> (u32, u32) {
    match client.search_collections("a", 1).await {
        Ok(page) => {
            let pages = if page.total_pages == 0 {
                FALLBACK_TOTAL_PAGES
            } else {
                page.total_pages
            };
            let results = if page.total_results == 0 {
                FALLBACK_TOTAL_RESULTS
            } else {
                page.total_results
            };
            (pages.min(max_total_pages), results)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Collection count lookup failed");
            (FALLBACK_TOTAL_PAGES, FALLBACK_TOTAL_RESULTS)
        }
    }
}

/// GET /api/collections
pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<CollectionsQuery>,
) -> Json<CollectionsResponse> {
    Json(load_collections(&state).await.filtered(query.q.as_deref()))
}
