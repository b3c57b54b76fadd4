//! TV show detail page and its lazily loaded season episode lists.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::Uri,
    response::{IntoResponse, Response},
};

use crate::discovery::format_rating;
use crate::services::tmdb::{TmdbEpisode, TmdbSeasonSummary};
use crate::AppState;

use super::utils::{format_runtime, image, language_name, year_label};

#[derive(Template)]
#[template(path = "pages/tv_detail.html")]
pub struct TvDetailTemplate {
    pub active_page: String,
    pub id: i64,
    pub name: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub year: String,
    pub rating: String,
    pub status: String,
    pub language: String,
    pub genres: Vec<String>,
    pub season_count: i32,
    pub episode_count: i32,
    pub play_href: String,
    pub seasons: Vec<SeasonView>,
}

pub struct SeasonView {
    pub number: i32,
    pub name: String,
    pub overview: String,
    pub air_year: String,
    pub episode_count: i32,
    pub poster_url: Option<String>,
    pub episodes_href: String,
}

impl SeasonView {
    fn new(state: &AppState, show_id: i64, s: &TmdbSeasonSummary) -> Self {
        Self {
            number: s.season_number,
            name: s.name.clone(),
            overview: s.overview.clone().unwrap_or_default(),
            air_year: year_label(s.air_date.as_deref()),
            episode_count: s.episode_count,
            poster_url: image(state, s.poster_path.as_deref(), "w154"),
            episodes_href: format!("/tv/{}/season/{}", show_id, s.season_number),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/season_episodes.html")]
pub struct SeasonEpisodesTemplate {
    pub episodes: Vec<EpisodeView>,
}

pub struct EpisodeView {
    pub number: i32,
    pub name: String,
    pub overview: String,
    pub still_url: Option<String>,
    pub runtime: String,
    pub rating: String,
    pub href: String,
}

impl EpisodeView {
    fn new(state: &AppState, show_id: i64, season: i32, e: &TmdbEpisode) -> Self {
        Self {
            number: e.episode_number,
            name: e.name.clone(),
            overview: e.overview.clone().unwrap_or_default(),
            still_url: image(state, e.still_path.as_deref(), "w300"),
            runtime: format_runtime(e.runtime.unwrap_or(0)),
            rating: format_rating(e.vote_average),
            href: format!(
                "/watch/{}?season={}&episode={}",
                show_id, season, e.episode_number
            ),
        }
    }
}

/// GET /tv/:id
pub async fn detail(State(state): State<AppState>, Path(id): Path<i64>, uri: Uri) -> Response {
    let show = match state.tmdb() {
        Ok(client) => client.get_tv(id).await,
        Err(e) => Err(e),
    };

    let show = match show {
        Ok(show) => show,
        Err(e) => {
            tracing::warn!(tv_id = id, error = %e, "TV show lookup failed");
            return super::not_found(uri).await.into_response();
        }
    };

    TvDetailTemplate {
        active_page: "tv".to_string(),
        id: show.id,
        overview: show.overview.clone().unwrap_or_default(),
        tagline: show.tagline.clone().filter(|t| !t.is_empty()),
        poster_url: image(&state, show.poster_path.as_deref(), "w500"),
        backdrop_url: image(&state, show.backdrop_path.as_deref(), "original"),
        year: year_label(show.first_air_date.as_deref()),
        rating: format_rating(show.vote_average),
        status: show.status.clone().unwrap_or_default(),
        language: language_name(show.original_language.as_deref()),
        genres: show.genres.iter().map(|g| g.name.clone()).collect(),
        season_count: show.number_of_seasons.unwrap_or(show.seasons.len() as i32),
        episode_count: show.number_of_episodes.unwrap_or(0),
        play_href: format!("/watch/{}?season=1&episode=1", show.id),
        seasons: show
            .seasons
            .iter()
            .map(|s| SeasonView::new(&state, show.id, s))
            .collect(),
        name: show.name,
    }
    .into_response()
}

/// GET /tv/:id/season/:season
///
/// HTMX fragment. A failed lookup renders an empty episode list.
pub async fn season(
    State(state): State<AppState>,
    Path((id, season)): Path<(i64, i32)>,
) -> impl IntoResponse {
    let result = match state.tmdb() {
        Ok(client) => client.get_season(id, season).await,
        Err(e) => Err(e),
    };

    let episodes = match result {
        Ok(s) => s
            .episodes
            .iter()
            .map(|e| EpisodeView::new(&state, id, season, e))
            .collect(),
        Err(e) => {
            tracing::warn!(tv_id = id, season, error = %e, "Season lookup failed");
            Vec::new()
        }
    };

    SeasonEpisodesTemplate { episodes }
}
