//! TMDB (The Movie Database) service client.
//!
//! Provides the list, discover, search and detail lookups the catalog pages
//! are built from.

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TmdbConfig;
use crate::discovery::MediaKind;
use crate::error::{AppError, Result};

/// Genre id TMDB uses for animation.
pub const ANIMATION_GENRE_ID: i64 = 16;

/// TMDB API client for fetching movie and TV show metadata.
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base: String,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key.
    ///
    /// Returns an error if the API key is empty or if the HTTP client cannot be built.
    pub fn new(api_key: String, config: &TmdbConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Internal(
                "TMDB API key cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base: config.image_base.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new TMDB client wrapped in Arc for shared access.
    pub fn new_shared(api_key: String, config: &TmdbConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(api_key, config)?))
    }

    /// Daily trending movies or TV shows.
    pub async fn trending_movies(&self) -> Result<TmdbPage<TmdbMovie>> {
        tracing::debug!("Fetching TMDB trending movies");
        self.get_page("/trending/movie/day", 1, &[]).await
    }

    /// Daily trending TV shows.
    pub async fn trending_tv(&self) -> Result<TmdbPage<TmdbTvShow>> {
        tracing::debug!("Fetching TMDB trending TV shows");
        self.get_page("/trending/tv/day", 1, &[]).await
    }

    /// A ranked movie list such as `popular` or `top_rated`.
    pub async fn movie_list(&self, list: &str, page: u32) -> Result<TmdbPage<TmdbMovie>> {
        tracing::debug!(list = %list, page = %page, "Fetching TMDB movie list");
        self.get_page(&format!("/movie/{}", list), page, &[]).await
    }

    /// A ranked TV list such as `airing_today` or `on_the_air`.
    pub async fn tv_list(&self, list: &str, page: u32) -> Result<TmdbPage<TmdbTvShow>> {
        tracing::debug!(list = %list, page = %page, "Fetching TMDB TV list");
        self.get_page(&format!("/tv/{}", list), page, &[]).await
    }

    /// Japanese animation from the TV discover endpoint, ordered by `sort_by`.
    pub async fn discover_anime(&self, sort_by: &str, page: u32) -> Result<TmdbPage<TmdbTvShow>> {
        tracing::debug!(sort_by = %sort_by, page = %page, "Discovering TMDB anime");
        let params = [
            ("with_genres", ANIMATION_GENRE_ID.to_string()),
            ("with_original_language", "ja".to_string()),
            ("sort_by", sort_by.to_string()),
        ];
        self.get_page("/discover/tv", page, &params).await
    }

    /// Search movies, TV shows and people in one request.
    pub async fn search_multi(&self, query: &str, page: u32) -> Result<TmdbPage<TmdbMultiResult>> {
        tracing::debug!(query = %query, page = %page, "Searching TMDB multi");
        self.get_page("/search/multi", page, &[("query", query.to_string())])
            .await
    }

    /// Search collections by name.
    pub async fn search_collections(
        &self,
        query: &str,
        page: u32,
    ) -> Result<TmdbPage<TmdbCollectionSummary>> {
        tracing::debug!(query = %query, page = %page, "Searching TMDB collections");
        self.get_page("/search/collection", page, &[("query", query.to_string())])
            .await
    }

    /// Get detailed information about a specific movie.
    pub async fn get_movie(&self, id: i64) -> Result<TmdbMovieDetails> {
        tracing::debug!(movie_id = %id, "Fetching TMDB movie details");
        self.get_with_params(&format!("/movie/{}", id), &[]).await
    }

    /// Get detailed information about a specific TV show.
    pub async fn get_tv(&self, id: i64) -> Result<TmdbTvDetails> {
        tracing::debug!(tv_id = %id, "Fetching TMDB TV show details");
        self.get_with_params(&format!("/tv/{}", id), &[]).await
    }

    /// Get season details including all episodes.
    pub async fn get_season(&self, show_id: i64, season_number: i32) -> Result<TmdbSeason> {
        tracing::debug!(
            show_id = %show_id,
            season = %season_number,
            "Fetching TMDB season details"
        );

        self.get_with_params(
            &format!("/tv/{}/season/{}", show_id, season_number),
            &[],
        )
        .await
    }

    /// Get a collection with all of its parts.
    pub async fn get_collection(&self, id: i64) -> Result<TmdbCollection> {
        tracing::debug!(collection_id = %id, "Fetching TMDB collection");
        self.get_with_params(&format!("/collection/{}", id), &[])
            .await
    }

    /// Titles similar to the given movie or show, normalized to one shape.
    pub async fn similar(&self, kind: MediaKind, id: i64) -> Result<Vec<TmdbTitle>> {
        tracing::debug!(kind = ?kind, id = %id, "Fetching TMDB similar titles");
        let path = format!("/{}/{}/similar", kind.tmdb_path(), id);
        match kind {
            MediaKind::Movie => {
                let page: TmdbPage<TmdbMovie> = self.get_page(&path, 1, &[]).await?;
                Ok(page.results.into_iter().map(TmdbTitle::from).collect())
            }
            MediaKind::Series => {
                let page: TmdbPage<TmdbTvShow> = self.get_page(&path, 1, &[]).await?;
                Ok(page.results.into_iter().map(TmdbTitle::from).collect())
            }
        }
    }

    /// Logo for a movie or show: English first, then whatever comes first.
    pub async fn logo(&self, kind: MediaKind, id: i64) -> Result<Option<String>> {
        let images: TmdbImages = self
            .get_with_params(&format!("/{}/{}/images", kind.tmdb_path(), id), &[])
            .await?;
        Ok(images.preferred_logo())
    }

    /// Build an image URL for the given path and size.
    ///
    /// Common sizes: "w154", "w500", "w780", "original"
    pub fn image_url(&self, path: &str, size: &str) -> String {
        image_url(&self.image_base, path, size)
    }

    async fn get_page<T>(
        &self,
        path: &str,
        page: u32,
        extra: &[(&str, String)],
    ) -> Result<TmdbPage<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut params: Vec<(&str, String)> = extra.to_vec();
        params.push(("page", page.max(1).to_string()));
        self.get_with_params(path, &params).await
    }

    /// Internal helper to perform GET requests with query parameters and deserialize JSON responses.
    async fn get_with_params<T>(&self, path: &str, extra: &[(&str, String)]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut params: Vec<(&str, String)> = vec![("api_key", self.api_key.clone())];
        params.extend(extra.iter().cloned());

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("TMDB request to {} failed: {}", path, e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Upstream(
                "TMDB API key is invalid or missing".to_string(),
            ));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "TMDB resource not found: {}",
                path
            )));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Upstream(
                "TMDB rate limit exceeded, please try again later".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "TMDB API {} returned error status: {}",
                path, status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::Upstream(format!(
                "Failed to parse TMDB response from {}: {}",
                path, e
            ))
        })
    }
}

/// `{base}/{size}{path}` for a TMDB image path.
pub fn image_url(base: &str, path: &str, size: &str) -> String {
    format!("{}/{}{}", base.trim_end_matches('/'), size, path)
}

// =============================================================================
// Response Types
// =============================================================================

/// Paged list envelope shared by every TMDB list endpoint.
#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

/// TMDB sends explicit `null` for missing scores and lists; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Movie list/search result from TMDB.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
}

/// TV show list/search result from TMDB.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvShow {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_country: Vec<String>,
}

/// One `search/multi` hit. People and unknown kinds land in `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum TmdbMultiResult {
    Movie(TmdbMovie),
    Tv(TmdbTvShow),
    #[serde(other)]
    Other,
}

/// A movie or show flattened to the fields list views need.
#[derive(Debug, Clone)]
pub struct TmdbTitle {
    pub id: i64,
    pub kind: MediaKind,
    pub title: String,
    pub overview: Option<String>,
    pub date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<i64>,
}

impl From<TmdbMovie> for TmdbTitle {
    fn from(m: TmdbMovie) -> Self {
        Self {
            id: m.id,
            kind: MediaKind::Movie,
            title: m.title,
            overview: m.overview,
            date: m.release_date,
            poster_path: m.poster_path,
            backdrop_path: m.backdrop_path,
            vote_average: m.vote_average,
            genre_ids: m.genre_ids,
        }
    }
}

impl From<TmdbTvShow> for TmdbTitle {
    fn from(t: TmdbTvShow) -> Self {
        Self {
            id: t.id,
            kind: MediaKind::Series,
            title: t.name,
            overview: t.overview,
            date: t.first_air_date,
            poster_path: t.poster_path,
            backdrop_path: t.backdrop_path,
            vote_average: t.vote_average,
            genre_ids: t.genre_ids,
        }
    }
}

impl TmdbMultiResult {
    /// Movie and TV hits as titles; everything else is dropped.
    pub fn into_title(self) -> Option<TmdbTitle> {
        match self {
            TmdbMultiResult::Movie(m) => Some(m.into()),
            TmdbMultiResult::Tv(t) => Some(t.into()),
            TmdbMultiResult::Other => None,
        }
    }
}

/// Detailed movie information from TMDB.
#[derive(Debug, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    pub runtime: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<TmdbGenre>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub original_language: Option<String>,
    pub belongs_to_collection: Option<TmdbCollectionRef>,
}

/// Back-pointer from a movie to the collection it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCollectionRef {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

/// Detailed TV show information from TMDB.
#[derive(Debug, Deserialize)]
pub struct TmdbTvDetails {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<TmdbGenre>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_run_time: Vec<i32>,
    pub original_language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seasons: Vec<TmdbSeasonSummary>,
}

/// Season summary included in TV show details.
#[derive(Debug, Deserialize)]
pub struct TmdbSeasonSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_count: i32,
    pub poster_path: Option<String>,
    pub season_number: i32,
}

/// Full season details including episodes.
#[derive(Debug, Deserialize)]
pub struct TmdbSeason {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
    pub season_number: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub episodes: Vec<TmdbEpisode>,
}

/// Episode information from TMDB.
#[derive(Debug, Deserialize)]
pub struct TmdbEpisode {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub episode_number: i32,
    pub season_number: i32,
    pub still_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    pub runtime: Option<i32>,
}

/// Genre information from TMDB.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

/// Collection with its member movies.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCollection {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<TmdbMovie>,
}

/// Collection search hit.
#[derive(Debug, Deserialize)]
pub struct TmdbCollectionSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

/// Image listing for a movie or show.
#[derive(Debug, Default, Deserialize)]
pub struct TmdbImages {
    #[serde(default, deserialize_with = "null_as_default")]
    pub logos: Vec<TmdbImage>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbImage {
    pub file_path: String,
    pub iso_639_1: Option<String>,
}

impl TmdbImages {
    pub fn preferred_logo(&self) -> Option<String> {
        self.logos
            .iter()
            .find(|l| l.iso_639_1.as_deref() == Some("en"))
            .or_else(|| self.logos.first())
            .map(|l| l.file_path.clone())
    }
}
