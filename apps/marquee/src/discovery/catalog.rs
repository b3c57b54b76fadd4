//! Catalog sections and the ranked TMDB lists behind each category.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::pager::PageSource;
use super::{MediaKind, MediaSummary, PageResult};
use crate::error::{AppError, Result};
use crate::services::tmdb::{TmdbClient, TmdbPage, TmdbTitle};

/// A browsable catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Movies,
    Tv,
    Anime,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Movies, Section::Tv, Section::Anime];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movies" => Some(Section::Movies),
            "tv" => Some(Section::Tv),
            "anime" => Some(Section::Anime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Movies => "movies",
            Section::Tv => "tv",
            Section::Anime => "anime",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Movies => "Movies",
            Section::Tv => "TV Shows",
            Section::Anime => "Anime",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Section::Movies => MediaKind::Movie,
            Section::Tv | Section::Anime => MediaKind::Series,
        }
    }

    /// Categories offered in this section, in tab order.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Section::Movies => &[
                Category::Popular,
                Category::NowPlaying,
                Category::TopRated,
                Category::Upcoming,
            ],
            Section::Tv => &[
                Category::Popular,
                Category::AiringToday,
                Category::TopRated,
                Category::OnTheAir,
            ],
            Section::Anime => &[Category::Trending, Category::Popular, Category::Recent],
        }
    }

    pub fn default_category(&self) -> Category {
        self.categories()[0]
    }

    pub fn supports(&self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// Resolve a `category` query value, falling back to the section default.
    pub fn category_or_default(&self, raw: Option<&str>) -> Category {
        raw.and_then(Category::parse)
            .filter(|c| self.supports(*c))
            .unwrap_or_else(|| self.default_category())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked list within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Popular,
    NowPlaying,
    TopRated,
    Upcoming,
    AiringToday,
    OnTheAir,
    Trending,
    Recent,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        let category = match s {
            "popular" => Category::Popular,
            "now_playing" => Category::NowPlaying,
            "top_rated" => Category::TopRated,
            "upcoming" => Category::Upcoming,
            "airing_today" => Category::AiringToday,
            "on_the_air" => Category::OnTheAir,
            "trending" => Category::Trending,
            "recent" => Category::Recent,
            _ => return None,
        };
        Some(category)
    }

    /// Query value, which doubles as the TMDB list name for movies and TV.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::NowPlaying => "now_playing",
            Category::TopRated => "top_rated",
            Category::Upcoming => "upcoming",
            Category::AiringToday => "airing_today",
            Category::OnTheAir => "on_the_air",
            Category::Trending => "trending",
            Category::Recent => "recent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Popular => "Popular",
            Category::NowPlaying => "Now Playing",
            Category::TopRated => "Top Rated",
            Category::Upcoming => "Upcoming",
            Category::AiringToday => "Airing Today",
            Category::OnTheAir => "On The Air",
            Category::Trending => "Trending",
            Category::Recent => "Recent",
        }
    }

    /// `sort_by` for the anime discover query.
    fn anime_sort(&self) -> Option<&'static str> {
        match self {
            Category::Trending => Some("popularity.desc"),
            Category::Popular => Some("vote_count.desc"),
            Category::Recent => Some("first_air_date.desc"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TmdbTitle> for MediaSummary {
    fn from(t: TmdbTitle) -> Self {
        Self {
            id: t.id,
            kind: t.kind,
            title: t.title,
            poster_path: t.poster_path,
            rating: t.vote_average,
            date: t.date,
        }
    }
}

fn summarize<T: Into<TmdbTitle>>(page: TmdbPage<T>) -> PageResult<MediaSummary> {
    PageResult {
        items: page
            .results
            .into_iter()
            .map(|r| {
                let title: TmdbTitle = r.into();
                MediaSummary::from(title)
            })
            .collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_results: page.total_results,
    }
}

/// TMDB-backed page source for one section.
pub struct CatalogSource {
    client: Arc<TmdbClient>,
    section: Section,
}

impl CatalogSource {
    pub fn new(client: Arc<TmdbClient>, section: Section) -> Self {
        Self { client, section }
    }
}

#[async_trait]
impl PageSource<Category, MediaSummary> for CatalogSource {
    async fn fetch_page(&self, category: Category, page: u32) -> Result<PageResult<MediaSummary>> {
        if !self.section.supports(category) {
            return Err(AppError::BadRequest(format!(
                "Category '{}' is not available in {}",
                category, self.section
            )));
        }

        match self.section {
            Section::Movies => {
                let page = self.client.movie_list(category.as_str(), page).await?;
                Ok(summarize(page))
            }
            Section::Tv => {
                let page = self.client.tv_list(category.as_str(), page).await?;
                Ok(summarize(page))
            }
            Section::Anime => {
                let sort_by = category.anime_sort().ok_or_else(|| {
                    AppError::BadRequest(format!("No anime ordering for '{}'", category))
                })?;
                let page = self.client.discover_anime(sort_by, page).await?;
                Ok(summarize(page))
            }
        }
    }
}
