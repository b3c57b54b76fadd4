//! Shared view models and formatting helpers for views

use crate::discovery::{format_rating, genre_name, year_of, FeaturedItem, MediaKind, MediaSummary};
use crate::services::tmdb::image_url;
use crate::AppState;

/// Poster or backdrop URL for an optional TMDB image path.
pub fn image(state: &AppState, path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| image_url(&state.config.tmdb.image_base, p, size))
}

/// Where a card links to: movies play directly, series open their detail page.
pub fn title_href(kind: MediaKind, id: i64) -> String {
    match kind {
        MediaKind::Movie => format!("/watch/{}", id),
        MediaKind::Series => format!("/tv/{}", id),
    }
}

/// Year as text, empty when unknown.
pub fn year_label(date: Option<&str>) -> String {
    year_of(date).map(|y| y.to_string()).unwrap_or_default()
}

/// Runtime in minutes as `2h 16m`, empty when unknown.
pub fn format_runtime(minutes: i32) -> String {
    if minutes <= 0 {
        return String::new();
    }
    let (h, m) = (minutes / 60, minutes % 60);
    if h == 0 {
        format!("{}m", m)
    } else {
        format!("{}h {}m", h, m)
    }
}

/// Dollar amount with thousands separators, empty when zero or unknown.
pub fn format_money(amount: Option<i64>) -> String {
    let Some(amount) = amount.filter(|a| *a > 0) else {
        return String::new();
    };
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${}", out)
}

/// English name for an ISO 639-1 code, or the code itself.
pub fn language_name(code: Option<&str>) -> String {
    let code = code.unwrap_or("en");
    let name = match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        other => return other.to_string(),
    };
    name.to_string()
}

/// A poster card in a grid or row.
pub struct CardView {
    pub href: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub year: String,
    pub rating: String,
    pub kind_label: &'static str,
}

impl CardView {
    pub fn from_summary(state: &AppState, item: &MediaSummary) -> Self {
        Self {
            href: title_href(item.kind, item.id),
            title: item.title.clone(),
            poster_url: image(state, item.poster_path.as_deref(), "w500"),
            year: year_label(item.date.as_deref()),
            rating: format_rating(item.rating),
            kind_label: item.kind.label(),
        }
    }

    pub fn list(state: &AppState, items: &[MediaSummary]) -> Vec<Self> {
        items.iter().map(|i| Self::from_summary(state, i)).collect()
    }
}

/// The featured hero as rendered.
pub struct HeroView {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub backdrop_url: Option<String>,
    pub logo_url: Option<String>,
    pub kind_label: &'static str,
    pub href: String,
    pub year: String,
    pub rating: String,
    pub genres: Vec<&'static str>,
}

impl HeroView {
    pub fn from_item(state: &AppState, item: &FeaturedItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            overview: item.overview.clone(),
            backdrop_url: image(state, item.backdrop_path.as_deref(), "original"),
            logo_url: image(state, item.logo_path.as_deref(), "w500"),
            kind_label: item.kind.label(),
            href: title_href(item.kind, item.id),
            year: year_label(item.date.as_deref()),
            rating: format_rating(item.rating),
            genres: item
                .genre_ids
                .iter()
                .filter_map(|id| genre_name(*id))
                .take(2)
                .collect(),
        }
    }
}

/// Thumbnail of the next hero item.
pub struct PreviewView {
    pub title: String,
    pub backdrop_url: Option<String>,
}

impl PreviewView {
    pub fn from_item(state: &AppState, item: &FeaturedItem) -> Self {
        Self {
            title: item.title.clone(),
            backdrop_url: image(state, item.backdrop_path.as_deref(), "w780"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(136), "2h 16m");
        assert_eq!(format_runtime(45), "45m");
        assert_eq!(format_runtime(0), "");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Some(63_000_000)), "$63,000,000");
        assert_eq!(format_money(Some(999)), "$999");
        assert_eq!(format_money(Some(0)), "");
        assert_eq!(format_money(None), "");
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name(Some("ja")), "Japanese");
        assert_eq!(language_name(Some("sv")), "sv");
        assert_eq!(language_name(None), "English");
    }

    #[test]
    fn test_title_href() {
        assert_eq!(title_href(MediaKind::Movie, 550), "/watch/550");
        assert_eq!(title_href(MediaKind::Series, 1399), "/tv/1399");
    }
}
