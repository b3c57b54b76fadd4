//! Home page: trending hero carousel plus top-rated rows.

use askama::Template;
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

use crate::api::hero::trending_featured;
use crate::discovery::{CarouselTiming, FeaturedItem, MediaSummary};
use crate::error::Result;
use crate::services::tmdb::TmdbTitle;
use crate::AppState;

use super::hero::HeroTemplate;
use super::utils::CardView;

/// Items shown in each top-rated row.
const ROW_LENGTH: usize = 10;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub active_page: String,
    pub hero: HeroTemplate,
    pub top_movies: Vec<CardView>,
    pub top_tv: Vec<CardView>,
}

#[derive(Default)]
struct HomeData {
    featured: Vec<FeaturedItem>,
    top_movies: Vec<MediaSummary>,
    top_tv: Vec<MediaSummary>,
}

/// Fetch the three home lists together. Any failure empties all of them.
async fn load_home(state: &AppState) -> HomeData {
    match try_load_home(state).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Home page lists unavailable");
            HomeData::default()
        }
    }
}

async fn try_load_home(state: &AppState) -> Result<HomeData> {
    let client = state.tmdb()?;

    let (featured, top_movies, top_tv) = tokio::try_join!(
        trending_featured(client, state.config.carousel.featured_count),
        client.movie_list("top_rated", 1),
        client.tv_list("top_rated", 1),
    )?;

    Ok(HomeData {
        featured,
        top_movies: top_movies
            .results
            .into_iter()
            .take(ROW_LENGTH)
            .map(|m| MediaSummary::from(TmdbTitle::from(m)))
            .collect(),
        top_tv: top_tv
            .results
            .into_iter()
            .take(ROW_LENGTH)
            .map(|t| MediaSummary::from(TmdbTitle::from(t)))
            .collect(),
    })
}

/// Render the home page. Loading it mounts a fresh carousel for the session.
pub async fn page(State(state): State<AppState>, cookies: CookieJar) -> impl IntoResponse {
    let (jar, session) = state.sessions.resolve(cookies).await;
    let data = load_home(&state).await;

    let carousel = session
        .mount_carousel(
            data.featured,
            CarouselTiming::from_config(&state.config.carousel),
        )
        .await;

    let template = HomeTemplate {
        active_page: "home".to_string(),
        hero: HeroTemplate::from_snapshot(&state, &carousel.snapshot()),
        top_movies: CardView::list(&state, &data.top_movies),
        top_tv: CardView::list(&state, &data.top_tv),
    };

    (jar, template)
}
