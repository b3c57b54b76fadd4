//! Client-facing discovery state: the featured-hero carousel, paginated
//! catalog grids and the collection scanner, plus the snapshot types they
//! hand to the views.

pub mod carousel;
pub mod catalog;
pub mod collections;
pub mod pager;

use serde::Serialize;

pub use carousel::{Carousel, CarouselController, CarouselSnapshot, CarouselState, CarouselTiming};
pub use catalog::{Category, Section};
pub use collections::{CollectionLookup, CollectionScanner, Grouping};
pub use pager::{FetchTicket, FilterState, PageChange, PageSource, PageView, Pager};

/// Kind of title a catalog entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment TMDB uses for this kind.
    pub fn tmdb_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }

    /// Badge shown on the hero.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "FILM",
            MediaKind::Series => "SERIES",
        }
    }
}

/// A title promoted in the featured hero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedItem {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub rating: f64,
    pub date: Option<String>,
    pub kind: MediaKind,
    pub genre_ids: Vec<i64>,
    pub logo_path: Option<String>,
}

/// One fetched page of a ranked remote list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
}

impl<T> PageResult<T> {
    /// The page a failed first load degrades to: the requested page, with nothing on it.
    pub fn empty(page: u32) -> Self {
        Self {
            items: Vec::new(),
            page,
            total_pages: page,
            total_results: 0,
        }
    }

    /// Cap `total_pages` at the ceiling the upstream actually serves.
    pub fn clamped(mut self, max_total_pages: u32) -> Self {
        self.total_pages = self.total_pages.min(max_total_pages);
        self
    }
}

/// A grid card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSummary {
    pub id: i64,
    pub kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub rating: f64,
    pub date: Option<String>,
}

/// Four-digit year from a `YYYY-MM-DD` date, if it parses.
pub fn year_of(date: Option<&str>) -> Option<i32> {
    use chrono::Datelike;

    let date = date?.trim();
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

/// Rating with one decimal, or `N/A` when TMDB has no votes.
pub fn format_rating(rating: f64) -> String {
    if rating > 0.0 {
        format!("{:.1}", rating)
    } else {
        "N/A".to_string()
    }
}

/// Display names for the TMDB genre ids the hero badges show.
pub fn genre_name(id: i64) -> Option<&'static str> {
    let name = match id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Sci-Fi",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        10759 => "Action & Adventure",
        10762 => "Kids",
        10763 => "News",
        10764 => "Reality",
        10765 => "Sci-Fi & Fantasy",
        10766 => "Soap",
        10767 => "Talk",
        10768 => "War & Politics",
        _ => return None,
    };
    Some(name)
}
