//! Featured-hero loaders and the session carousel snapshot.

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use futures::future::join_all;

use crate::discovery::{FeaturedItem, Section};
use crate::error::{AppError, Result};
use crate::services::tmdb::{TmdbClient, TmdbTitle};
use crate::AppState;

impl From<TmdbTitle> for FeaturedItem {
    fn from(t: TmdbTitle) -> Self {
        Self {
            id: t.id,
            title: t.title,
            overview: t.overview.unwrap_or_default(),
            poster_path: t.poster_path,
            backdrop_path: t.backdrop_path,
            rating: t.vote_average,
            date: t.date,
            kind: t.kind,
            genre_ids: t.genre_ids,
            logo_path: None,
        }
    }
}

/// The first `count` trending movies, with logos.
pub async fn trending_featured(client: &TmdbClient, count: usize) -> Result<Vec<FeaturedItem>> {
    let page = client.trending_movies().await?;
    let titles = page
        .results
        .into_iter()
        .take(count)
        .map(TmdbTitle::from)
        .collect();
    Ok(attach_logos(client, titles).await)
}

/// The single title a section page leads with: today's top trending movie
/// or show, or the most popular show for TV.
pub async fn section_featured(client: &TmdbClient, section: Section) -> Result<Vec<FeaturedItem>> {
    let first: Option<TmdbTitle> = match section {
        Section::Movies => return trending_featured(client, 1).await,
        Section::Tv => client
            .tv_list("popular", 1)
            .await?
            .results
            .into_iter()
            .next()
            .map(Into::into),
        Section::Anime => client
            .trending_tv()
            .await?
            .results
            .into_iter()
            .next()
            .map(Into::into),
    };

    Ok(attach_logos(client, first.into_iter().collect()).await)
}

/// Look up logos concurrently. A failed lookup only costs that item its logo.
pub async fn attach_logos(client: &TmdbClient, titles: Vec<TmdbTitle>) -> Vec<FeaturedItem> {
    let logos = join_all(titles.iter().map(|t| client.logo(t.kind, t.id))).await;

    titles
        .into_iter()
        .zip(logos)
        .map(|(title, logo)| {
            let logo_path = logo.unwrap_or_else(|e| {
                tracing::warn!(id = title.id, error = %e, "Logo lookup failed");
                None
            });
            FeaturedItem {
                logo_path,
                ..FeaturedItem::from(title)
            }
        })
        .collect()
}

/// GET /api/hero
pub async fn get_hero(
    State(state): State<AppState>,
    cookies: CookieJar,
) -> Result<impl IntoResponse> {
    let carousel = match state.sessions.get(&cookies).await {
        Some(session) => session.carousel().await,
        None => None,
    };

    carousel
        .map(|c| Json(c.snapshot()))
        .ok_or_else(|| AppError::NotFound("No hero mounted for this session".to_string()))
}
