//! Watch page: embedded player, title details and similar titles.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Response},
};

use crate::api::embed::WatchQuery;
use crate::discovery::{format_rating, MediaKind, MediaSummary};
use crate::error::Result;
use crate::services::tmdb::{TmdbClient, TmdbMovieDetails, TmdbTvDetails};
use crate::services::EmbedTarget;
use crate::AppState;

use super::utils::{format_money, format_runtime, image, language_name, year_label, CardView};

/// Similar titles shown under the player.
const SIMILAR_LIMIT: usize = 10;

#[derive(Template)]
#[template(path = "pages/watch.html")]
pub struct WatchTemplate {
    pub active_page: String,
    pub heading: String,
    pub title: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub year: String,
    pub rating: String,
    pub runtime: String,
    pub language: String,
    pub status: String,
    pub budget: String,
    pub revenue: String,
    pub genres: Vec<String>,
    pub embed_url: String,
    pub back_href: String,
    pub sources: Vec<SourceTab>,
    pub episode: Option<EpisodePicker>,
    pub similar: Vec<CardView>,
}

pub struct SourceTab {
    pub href: String,
    pub label: String,
    pub quality: String,
    pub active: bool,
}

/// Season and episode navigation for a series watch.
pub struct EpisodePicker {
    pub season: u32,
    pub episode: u32,
    pub seasons: Vec<SeasonLink>,
    pub episodes: Vec<EpisodeLink>,
}

pub struct SeasonLink {
    pub number: i32,
    pub href: String,
    pub active: bool,
}

pub struct EpisodeLink {
    pub number: i32,
    pub name: String,
    pub href: String,
    pub active: bool,
}

/// Movie and show details folded into what the page shows.
struct Details {
    title: String,
    overview: String,
    tagline: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    date: Option<String>,
    rating: f64,
    runtime: Option<i32>,
    language: Option<String>,
    status: Option<String>,
    budget: Option<i64>,
    revenue: Option<i64>,
    genres: Vec<String>,
    seasons: Vec<i32>,
}

impl From<TmdbMovieDetails> for Details {
    fn from(m: TmdbMovieDetails) -> Self {
        Self {
            title: m.title,
            overview: m.overview.unwrap_or_default(),
            tagline: m.tagline.filter(|t| !t.is_empty()),
            poster_path: m.poster_path,
            backdrop_path: m.backdrop_path,
            date: m.release_date,
            rating: m.vote_average,
            runtime: m.runtime,
            language: m.original_language,
            status: m.status,
            budget: m.budget,
            revenue: m.revenue,
            genres: m.genres.into_iter().map(|g| g.name).collect(),
            seasons: Vec::new(),
        }
    }
}

impl From<TmdbTvDetails> for Details {
    fn from(t: TmdbTvDetails) -> Self {
        Self {
            title: t.name,
            overview: t.overview.unwrap_or_default(),
            tagline: t.tagline.filter(|t| !t.is_empty()),
            poster_path: t.poster_path,
            backdrop_path: t.backdrop_path,
            date: t.first_air_date,
            rating: t.vote_average,
            runtime: t.episode_run_time.first().copied(),
            language: t.original_language,
            status: t.status,
            budget: None,
            revenue: None,
            genres: t.genres.into_iter().map(|g| g.name).collect(),
            // Specials (season 0) are not offered in the picker
            seasons: t
                .seasons
                .iter()
                .map(|s| s.season_number)
                .filter(|n| *n > 0)
                .collect(),
        }
    }
}

async fn fetch_details(client: &TmdbClient, target: EmbedTarget) -> Result<Details> {
    match target {
        EmbedTarget::Movie { id } => client.get_movie(id).await.map(Details::from),
        EmbedTarget::Episode { id, .. } => client.get_tv(id).await.map(Details::from),
    }
}

async fn fetch_similar(client: &TmdbClient, target: EmbedTarget) -> Vec<MediaSummary> {
    let kind = if target.is_episode() {
        MediaKind::Series
    } else {
        MediaKind::Movie
    };

    match client.similar(kind, target.id()).await {
        Ok(titles) => titles
            .into_iter()
            .take(SIMILAR_LIMIT)
            .map(MediaSummary::from)
            .collect(),
        Err(e) => {
            tracing::warn!(id = target.id(), error = %e, "Similar titles unavailable");
            Vec::new()
        }
    }
}

/// Episodes of the playing season. A failure leaves the list empty.
async fn fetch_episodes(client: &TmdbClient, target: EmbedTarget) -> Vec<(i32, String)> {
    let EmbedTarget::Episode { id, season, .. } = target else {
        return Vec::new();
    };

    match client.get_season(id, season as i32).await {
        Ok(season) => season
            .episodes
            .into_iter()
            .map(|e| (e.episode_number, e.name))
            .collect(),
        Err(e) => {
            tracing::warn!(show_id = id, season, error = %e, "Season episodes unavailable");
            Vec::new()
        }
    }
}

fn watch_href(id: i64, season: u32, episode: u32, source: &str) -> String {
    format!(
        "/watch/{}?season={}&episode={}&source={}",
        id, season, episode, source
    )
}

fn source_href(target: EmbedTarget, source: &str) -> String {
    match target {
        EmbedTarget::Movie { id } => format!("/watch/{}?source={}", id, source),
        EmbedTarget::Episode {
            id,
            season,
            episode,
        } => watch_href(id, season, episode, source),
    }
}

fn episode_picker(
    target: EmbedTarget,
    source: &str,
    seasons: &[i32],
    episodes: Vec<(i32, String)>,
) -> Option<EpisodePicker> {
    let EmbedTarget::Episode {
        id,
        season,
        episode,
    } = target
    else {
        return None;
    };

    Some(EpisodePicker {
        season,
        episode,
        seasons: seasons
            .iter()
            .map(|n| SeasonLink {
                number: *n,
                href: watch_href(id, *n as u32, 1, source),
                active: *n == season as i32,
            })
            .collect(),
        episodes: episodes
            .into_iter()
            .map(|(number, name)| EpisodeLink {
                number,
                name,
                href: watch_href(id, season, number as u32, source),
                active: number == episode as i32,
            })
            .collect(),
    })
}

/// GET /watch/:id
pub async fn page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<WatchQuery>,
    uri: Uri,
) -> Response {
    let target = query.target(id);
    let provider = state.embed.provider(query.source.as_deref());

    let client = match state.tmdb() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(id, error = %e, "Watch page without a TMDB client");
            return super::not_found(uri).await.into_response();
        }
    };

    let (details, similar, episodes) = tokio::join!(
        fetch_details(client, target),
        fetch_similar(client, target),
        fetch_episodes(client, target),
    );

    let details = match details {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(id, error = %e, "Watch lookup failed");
            return super::not_found(uri).await.into_response();
        }
    };

    let heading = match target {
        EmbedTarget::Episode {
            season, episode, ..
        } => format!("{} - S{} E{}", details.title, season, episode),
        EmbedTarget::Movie { .. } => details.title.clone(),
    };

    let back_href = if target.is_episode() {
        format!("/tv/{}", id)
    } else {
        "/movies".to_string()
    };

    let sources = state
        .embed
        .providers()
        .iter()
        .map(|p| SourceTab {
            href: source_href(target, &p.id),
            label: p.label.clone(),
            quality: p.quality.clone(),
            active: p.id == provider.id,
        })
        .collect();

    WatchTemplate {
        active_page: if target.is_episode() { "tv" } else { "movies" }.to_string(),
        heading,
        overview: details.overview,
        tagline: details.tagline,
        poster_url: image(&state, details.poster_path.as_deref(), "w500"),
        backdrop_url: image(&state, details.backdrop_path.as_deref(), "original"),
        year: year_label(details.date.as_deref()),
        rating: format_rating(details.rating),
        runtime: format_runtime(details.runtime.unwrap_or(0)),
        language: language_name(details.language.as_deref()),
        status: details.status.unwrap_or_default(),
        budget: format_money(details.budget),
        revenue: format_money(details.revenue),
        genres: details.genres,
        embed_url: provider.url_for(target),
        back_href,
        sources,
        episode: episode_picker(target, &provider.id, &details.seasons, episodes),
        similar: CardView::list(&state, &similar),
        title: details.title,
    }
    .into_response()
}
