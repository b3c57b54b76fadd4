//! Movies, TV and anime pages with their paginated grids.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::api::catalog::{drive_pager, load_section, CatalogQuery, CatalogView};
use crate::api::hero::section_featured;
use crate::discovery::{CarouselTiming, FeaturedItem, Section};
use crate::response::{hx_trigger, PAGE_CHANGED_EVENT};
use crate::AppState;

use super::hero::HeroTemplate;
use super::utils::CardView;

#[derive(Template)]
#[template(path = "pages/section.html")]
pub struct SectionTemplate {
    pub active_page: String,
    pub title: String,
    pub hero: Option<HeroTemplate>,
    pub grid: GridTemplate,
}

#[derive(Template)]
#[template(path = "partials/grid.html")]
pub struct GridTemplate {
    pub section: String,
    pub category: String,
    pub category_label: String,
    pub tabs: Vec<TabView>,
    pub cards: Vec<CardView>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub loading: bool,
}

impl GridTemplate {
    pub fn new(state: &AppState, section: Section, view: &CatalogView) -> Self {
        Self {
            section: section.as_str().to_string(),
            category: view.category.as_str().to_string(),
            category_label: view.category.label().to_string(),
            tabs: section
                .categories()
                .iter()
                .map(|c| TabView {
                    value: c.as_str(),
                    label: c.label(),
                    active: *c == view.category,
                })
                .collect(),
            cards: CardView::list(state, &view.items),
            page: view.page,
            total_pages: view.total_pages,
            total_results: view.total_results,
            loading: view.loading,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous_page(&self) -> u32 {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> u32 {
        self.page + 1
    }
}

pub struct TabView {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Lead title for pages with a single hero. Failures leave the hero out.
async fn load_featured(state: &AppState, section: Section) -> Vec<FeaturedItem> {
    let Ok(client) = state.tmdb() else {
        return Vec::new();
    };
    section_featured(client, section).await.unwrap_or_else(|e| {
        tracing::warn!(section = %section, error = %e, "Featured title unavailable");
        Vec::new()
    })
}

async fn section_page(
    state: AppState,
    cookies: CookieJar,
    section: Section,
    query: CatalogQuery,
) -> Response {
    let (jar, session) = state.sessions.resolve(cookies).await;

    let (view, featured) = tokio::join!(
        load_section(&state, &session, section, &query),
        load_featured(&state, section),
    );

    // Section heroes hold a single title and never auto-advance
    let timing = CarouselTiming::from_config(&state.config.carousel).without_auto_advance();
    let carousel = session.mount_carousel(featured, timing).await;
    let snapshot = carousel.snapshot();
    let hero = (snapshot.len > 0).then(|| HeroTemplate::from_snapshot(&state, &snapshot));

    let template = SectionTemplate {
        active_page: section.as_str().to_string(),
        title: section.title().to_string(),
        hero,
        grid: GridTemplate::new(&state, section, &view),
    };

    (jar, template).into_response()
}

async fn grid(state: AppState, cookies: CookieJar, section: Section, query: CatalogQuery) -> Response {
    let session = state.sessions.get_or_transient(&cookies).await;
    let outcome = drive_pager(&state, &session, section, &query).await;

    // Scrolling is the browser's reaction to the page change, not to the data
    let headers = outcome
        .change
        .map(|change| hx_trigger(PAGE_CHANGED_EVENT, &change))
        .unwrap_or_default();

    (headers, GridTemplate::new(&state, section, &outcome.view)).into_response()
}

/// GET /movies
pub async fn movies(
    State(state): State<AppState>,
    cookies: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    section_page(state, cookies, Section::Movies, query).await
}

/// GET /tv
pub async fn tv(
    State(state): State<AppState>,
    cookies: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    section_page(state, cookies, Section::Tv, query).await
}

/// GET /anime
pub async fn anime(
    State(state): State<AppState>,
    cookies: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    section_page(state, cookies, Section::Anime, query).await
}

/// GET /movies/grid
pub async fn movies_grid(
    State(state): State<AppState>,
    cookies: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    grid(state, cookies, Section::Movies, query).await
}

/// GET /tv/grid
pub async fn tv_grid(
    State(state): State<AppState>,
    cookies: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    grid(state, cookies, Section::Tv, query).await
}

/// GET /anime/grid
pub async fn anime_grid(
    State(state): State<AppState>,
    cookies: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    grid(state, cookies, Section::Anime, query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::discovery::{Category, MediaKind, MediaSummary};

    fn offline_state() -> AppState {
        AppState::new(Config::default(), None).unwrap()
    }

    fn view(loading: bool, titles: &[&str]) -> CatalogView {
        CatalogView {
            category: Category::Popular,
            page: 2,
            total_pages: 5,
            total_results: 100,
            loading,
            items: titles
                .iter()
                .enumerate()
                .map(|(i, title)| MediaSummary {
                    id: i as i64 + 1,
                    kind: MediaKind::Movie,
                    title: title.to_string(),
                    poster_path: None,
                    rating: 7.0,
                    date: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_loading_grid_keeps_previous_cards_dimmed() {
        let state = offline_state();
        let html = GridTemplate::new(&state, Section::Movies, &view(true, &["Heat", "Ronin"]))
            .render()
            .unwrap();

        assert!(html.contains("Heat"));
        assert!(html.contains("Ronin"));
        assert!(html.contains("grid-stale"));
        assert!(html.contains("aria-busy"));
    }

    #[test]
    fn test_settled_grid_is_not_dimmed() {
        let state = offline_state();
        let html = GridTemplate::new(&state, Section::Movies, &view(false, &["Heat"]))
            .render()
            .unwrap();

        assert!(html.contains("Heat"));
        assert!(!html.contains("grid-stale"));
    }

    #[test]
    fn test_empty_grid_status() {
        let state = offline_state();
        let loading = GridTemplate::new(&state, Section::Movies, &view(true, &[]))
            .render()
            .unwrap();
        assert!(loading.contains("Loading"));

        let settled = GridTemplate::new(&state, Section::Movies, &view(false, &[]))
            .render()
            .unwrap();
        assert!(settled.contains("Nothing to show here right now."));
    }

    #[test]
    fn test_grid_buttons_scroll_on_request() {
        let state = offline_state();
        let html = GridTemplate::new(&state, Section::Movies, &view(false, &["Heat"]))
            .render()
            .unwrap();

        // Four category tabs plus previous and next
        assert_eq!(html.matches("data-scroll-results").count(), 6);
    }
}
