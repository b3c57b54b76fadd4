//! Search page - thin wrapper around the search API loader

use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::api::search::{run_search, SearchQuery};
use crate::response::ContentNegotiation;
use crate::AppState;

use super::utils::CardView;

#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub active_page: String,
    pub query: String,
    pub results: SearchResultsTemplate,
}

#[derive(Template)]
#[template(path = "partials/search_results.html")]
pub struct SearchResultsTemplate {
    pub query: String,
    pub query_encoded: String,
    pub cards: Vec<CardView>,
    pub page: u32,
    pub has_more: bool,
}

impl SearchResultsTemplate {
    pub fn next_page(&self) -> u32 {
        self.page + 1
    }
}

/// GET /search
pub async fn page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let response = run_search(&state, &query).await;

    let results = SearchResultsTemplate {
        query_encoded: urlencoding::encode(&response.query).into_owned(),
        query: response.query.clone(),
        cards: CardView::list(&state, &response.items),
        page: response.page,
        has_more: response.has_more,
    };

    // Return partial for HTMX requests, full page otherwise
    if headers.is_htmx() {
        results.into_response()
    } else {
        SearchTemplate {
            active_page: "search".to_string(),
            query: response.query,
            results,
        }
        .into_response()
    }
}
