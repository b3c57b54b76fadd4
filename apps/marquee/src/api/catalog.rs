//! Catalog grids driven by the session pager.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::discovery::catalog::CatalogSource;
use crate::discovery::pager::run_fetch;
use crate::discovery::{
    Category, FetchTicket, MediaSummary, PageChange, PageResult, PageSource, PageView, Pager, Section,
};
use crate::error::{AppError, Result};
use crate::session::{CatalogPager, Session};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub page: Option<u32>,
}

pub type CatalogView = PageView<Category, MediaSummary>;

/// A pager update and the page change it announced, if any.
pub struct CatalogOutcome {
    pub view: CatalogView,
    pub change: Option<PageChange<Category>>,
}

pub fn parse_section(raw: &str) -> Result<Section> {
    Section::parse(raw).ok_or_else(|| AppError::NotFound(format!("Unknown section '{}'", raw)))
}

/// Mount a fresh pager for `section`, as a full page load does, and fetch its first page.
pub async fn load_section(
    state: &AppState,
    session: &Session,
    section: Section,
    query: &CatalogQuery,
) -> CatalogView {
    let pager = mount(state, session, section, query).await;
    let view = pager.lock().await.view();
    view
}

async fn mount(
    state: &AppState,
    session: &Session,
    section: Section,
    query: &CatalogQuery,
) -> Arc<Mutex<CatalogPager>> {
    let category = section.category_or_default(query.category.as_deref());
    let first = first_page(state, section, category).await;
    let pager = session
        .mount_pager(
            section,
            Pager::with_snapshot(category, first, state.config.catalog.max_total_pages),
        )
        .await;

    if let Some(page) = query.page.filter(|p| *p > 1) {
        let ticket = pager.lock().await.set_page(page);
        if let Some(ticket) = ticket {
            fetch(state, &pager, section, ticket).await;
        }
    }

    pager
}

/// The page a freshly mounted pager starts from. Failures degrade to an empty page 1.
async fn first_page(state: &AppState, section: Section, category: Category) -> PageResult<MediaSummary> {
    let result = match state.tmdb_client.clone() {
        Some(client) => CatalogSource::new(client, section).fetch_page(category, 1).await,
        None => Err(AppError::Upstream("TMDB client not configured".to_string())),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(section = %section, category = %category, error = %e, "First page unavailable");
        PageResult::empty(1)
    })
}

/// Apply a category or page request to the session's pager.
///
/// A category different from the active one wins and resets to page 1; the
/// page parameter is only honored within the active category. A missing or
/// unknown category keeps the active one.
pub async fn drive_pager(
    state: &AppState,
    session: &Session,
    section: Section,
    query: &CatalogQuery,
) -> CatalogOutcome {
    let pager = match session.pager(section).await {
        Some(pager) => pager,
        None => mount(state, session, section, &CatalogQuery::default()).await,
    };

    let (ticket, mut changes) = {
        let mut p = pager.lock().await;
        let changes = p.subscribe();
        let requested = query
            .category
            .as_deref()
            .and_then(Category::parse)
            .filter(|c| section.supports(*c))
            .unwrap_or(p.filter().category);

        let ticket = if requested != p.filter().category {
            p.set_category(requested)
        } else {
            query.page.and_then(|page| p.set_page(page))
        };
        (ticket, changes)
    };

    let mut change = None;
    while let Ok(c) = changes.try_recv() {
        change = Some(c);
    }

    if let Some(ticket) = ticket {
        fetch(state, &pager, section, ticket).await;
    }

    let view = pager.lock().await.view();
    CatalogOutcome { view, change }
}

async fn fetch(
    state: &AppState,
    pager: &Mutex<CatalogPager>,
    section: Section,
    ticket: FetchTicket<Category>,
) {
    match state.tmdb_client.clone() {
        Some(client) => {
            run_fetch(pager, &CatalogSource::new(client, section), ticket).await;
        }
        None => {
            pager.lock().await.complete(
                ticket,
                Err(AppError::Upstream("TMDB client not configured".to_string())),
            );
        }
    }
}

/// GET /api/catalog/:section
pub async fn get_catalog(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(query): Query<CatalogQuery>,
    cookies: CookieJar,
) -> Result<impl IntoResponse> {
    let section = parse_section(&section)?;
    let session = state.sessions.get_or_transient(&cookies).await;
    let outcome = drive_pager(&state, &session, section, &query).await;
    Ok(Json(outcome.view))
}
