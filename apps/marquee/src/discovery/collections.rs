//! Distinct movie collections discovered by walking a ranked movie list.
//!
//! The walk is sequential: one ranked page at a time, one detail lookup per
//! movie, stopping as soon as the cap is reached. A collection id is marked
//! seen before its detail is resolved, so a collection whose lookup failed is
//! never retried later in the same scan.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;

use super::{MediaSummary, PageResult};
use crate::config::CollectionsConfig;
use crate::error::Result;
use crate::services::tmdb::{TmdbClient, TmdbCollection, TmdbTitle};

/// A named set of movies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    pub id: i64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Members ordered by release date; undated entries last.
    pub parts: Vec<MediaSummary>,
}

impl From<TmdbCollection> for Grouping {
    fn from(c: TmdbCollection) -> Self {
        let mut parts: Vec<MediaSummary> = c
            .parts
            .into_iter()
            .map(|m| MediaSummary::from(TmdbTitle::from(m)))
            .collect();
        parts.sort_by(|a, b| match (release_key(a), release_key(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        Self {
            id: c.id,
            name: c.name,
            overview: c.overview.filter(|o| !o.trim().is_empty()),
            poster_path: c.poster_path,
            backdrop_path: c.backdrop_path,
            parts,
        }
    }
}

fn release_key(item: &MediaSummary) -> Option<&str> {
    item.date.as_deref().filter(|d| !d.is_empty())
}

/// What the scanner needs from the metadata service.
#[async_trait]
pub trait CollectionLookup: Send + Sync {
    /// Movie ids on one page of the ranked list.
    async fn ranked_page(&self, page: u32) -> Result<PageResult<i64>>;

    /// Collection a movie belongs to, if any.
    async fn grouping_of(&self, movie_id: i64) -> Result<Option<i64>>;

    async fn grouping(&self, id: i64) -> Result<Grouping>;
}

#[async_trait]
impl CollectionLookup for TmdbClient {
    async fn ranked_page(&self, page: u32) -> Result<PageResult<i64>> {
        let list = self.movie_list("top_rated", page).await?;
        Ok(PageResult {
            items: list.results.iter().map(|m| m.id).collect(),
            page: list.page,
            total_pages: list.total_pages,
            total_results: list.total_results,
        })
    }

    async fn grouping_of(&self, movie_id: i64) -> Result<Option<i64>> {
        let movie = self.get_movie(movie_id).await?;
        Ok(movie.belongs_to_collection.map(|c| c.id))
    }

    async fn grouping(&self, id: i64) -> Result<Grouping> {
        Ok(self.get_collection(id).await?.into())
    }
}

/// Private to one scan.
struct Accumulator {
    seen: HashSet<i64>,
    found: Vec<Grouping>,
    cap: usize,
}

impl Accumulator {
    fn new(cap: usize) -> Self {
        Self {
            seen: HashSet::new(),
            found: Vec::with_capacity(cap),
            cap,
        }
    }

    fn is_full(&self) -> bool {
        self.found.len() >= self.cap
    }

    /// Returns `true` the first time an id is offered.
    fn mark_seen(&mut self, id: i64) -> bool {
        self.seen.insert(id)
    }

    fn push(&mut self, grouping: Grouping) {
        self.found.push(grouping);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollectionScanner {
    cap: usize,
    max_pages: u32,
}

impl CollectionScanner {
    pub fn new(cap: usize, max_pages: u32) -> Self {
        Self { cap, max_pages }
    }

    pub fn from_config(config: &CollectionsConfig) -> Self {
        Self::new(config.cap, config.max_pages)
    }

    /// Walk the ranked list and return up to `cap` distinct collections in discovery order.
    ///
    /// Never fails: lookup errors skip the item, and a ranked page that fails
    /// to load is logged and passed over.
    pub async fn scan<L>(&self, lookup: &L) -> Vec<Grouping>
    where
        L: CollectionLookup + ?Sized,
    {
        let mut acc = Accumulator::new(self.cap);
        let mut last_page = self.max_pages;
        let mut page = 1;

        while !acc.is_full() && page <= last_page {
            match lookup.ranked_page(page).await {
                Ok(ranked) => {
                    if ranked.items.is_empty() {
                        break;
                    }
                    last_page = last_page.min(ranked.total_pages);
                    visit_page(lookup, &mut acc, ranked.items).await;
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "Ranked page fetch failed, moving to the next page");
                }
            }
            page += 1;
        }

        tracing::debug!(found = acc.found.len(), pages = page - 1, "Collection scan finished");
        acc.found
    }
}

async fn visit_page<L>(lookup: &L, acc: &mut Accumulator, movie_ids: Vec<i64>)
where
    L: CollectionLookup + ?Sized,
{
    for movie_id in movie_ids {
        if acc.is_full() {
            break;
        }

        let grouping_id = match lookup.grouping_of(movie_id).await {
            Ok(Some(id)) => id,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(movie_id, error = %e, "Skipping movie, detail lookup failed");
                continue;
            }
        };

        if !acc.mark_seen(grouping_id) {
            continue;
        }

        match lookup.grouping(grouping_id).await {
            Ok(grouping) => acc.push(grouping),
            Err(e) => {
                tracing::warn!(collection_id = grouping_id, error = %e, "Collection lookup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Ranked pages of movie ids, a movie -> collection map and a set of
    /// collection ids whose lookup fails.
    #[derive(Default)]
    struct FakeLookup {
        pages: Vec<Vec<i64>>,
        unlimited: bool,
        membership: HashMap<i64, i64>,
        broken_collections: HashSet<i64>,
        broken_pages: HashSet<u32>,
        collection_calls: Mutex<Vec<i64>>,
    }

    impl FakeLookup {
        fn grouping_fixture(id: i64) -> Grouping {
            Grouping {
                id,
                name: format!("Collection {}", id),
                overview: None,
                poster_path: None,
                backdrop_path: None,
                parts: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl CollectionLookup for FakeLookup {
        async fn ranked_page(&self, page: u32) -> Result<PageResult<i64>> {
            if self.broken_pages.contains(&page) {
                return Err(AppError::Upstream("rate limited".to_string()));
            }
            if self.unlimited {
                let start = (page as i64 - 1) * 20;
                return Ok(PageResult {
                    items: (start..start + 20).collect(),
                    page,
                    total_pages: 500,
                    total_results: 10_000,
                });
            }
            let items = self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default();
            Ok(PageResult {
                items,
                page,
                total_pages: self.pages.len() as u32,
                total_results: 0,
            })
        }

        async fn grouping_of(&self, movie_id: i64) -> Result<Option<i64>> {
            if self.unlimited {
                return Ok(Some(movie_id + 1000));
            }
            Ok(self.membership.get(&movie_id).copied())
        }

        async fn grouping(&self, id: i64) -> Result<Grouping> {
            self.collection_calls.lock().unwrap().push(id);
            if self.broken_collections.contains(&id) {
                return Err(AppError::Upstream("timeout".to_string()));
            }
            Ok(Self::grouping_fixture(id))
        }
    }

    fn ids(found: &[Grouping]) -> Vec<i64> {
        found.iter().map(|g| g.id).collect()
    }

    #[tokio::test]
    async fn test_unlimited_source_yields_exactly_cap() {
        let lookup = FakeLookup {
            unlimited: true,
            ..Default::default()
        };

        let found = CollectionScanner::new(20, 5).scan(&lookup).await;
        assert_eq!(found.len(), 20);
        assert_eq!(lookup.collection_calls.lock().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_shared_grouping_reported_once() {
        let lookup = FakeLookup {
            pages: vec![vec![1, 2, 3, 4, 5, 6]],
            membership: HashMap::from([(1, 77), (2, 77), (3, 77), (4, 77), (5, 77), (6, 88)]),
            ..Default::default()
        };

        let found = CollectionScanner::new(20, 5).scan(&lookup).await;
        assert_eq!(ids(&found), vec![77, 88]);
        assert_eq!(*lookup.collection_calls.lock().unwrap(), vec![77, 88]);
    }

    #[tokio::test]
    async fn test_items_without_grouping_are_skipped() {
        let lookup = FakeLookup {
            pages: vec![vec![1, 2, 3], vec![4, 5]],
            membership: HashMap::from([(2, 10), (5, 20)]),
            ..Default::default()
        };

        let found = CollectionScanner::new(20, 5).scan(&lookup).await;
        assert_eq!(ids(&found), vec![10, 20]);
    }

    #[tokio::test]
    async fn test_failed_grouping_stays_seen() {
        let lookup = FakeLookup {
            pages: vec![vec![1, 2, 3]],
            membership: HashMap::from([(1, 10), (2, 10), (3, 30)]),
            broken_collections: HashSet::from([10]),
            ..Default::default()
        };

        let found = CollectionScanner::new(20, 5).scan(&lookup).await;
        assert_eq!(ids(&found), vec![30]);
        // 10 was attempted once and not retried for movie 2
        assert_eq!(*lookup.collection_calls.lock().unwrap(), vec![10, 30]);
    }

    #[tokio::test]
    async fn test_failed_ranked_page_is_skipped() {
        let lookup = FakeLookup {
            pages: vec![vec![1], vec![2], vec![3]],
            membership: HashMap::from([(1, 10), (2, 20), (3, 30)]),
            broken_pages: HashSet::from([2]),
            ..Default::default()
        };

        let found = CollectionScanner::new(20, 5).scan(&lookup).await;
        assert_eq!(ids(&found), vec![10, 30]);
    }

    #[tokio::test]
    async fn test_every_ranked_page_failing_yields_nothing() {
        let lookup = FakeLookup {
            pages: vec![vec![1], vec![2]],
            membership: HashMap::from([(1, 10), (2, 20)]),
            broken_pages: (1..=5).collect(),
            ..Default::default()
        };

        assert!(CollectionScanner::new(20, 5).scan(&lookup).await.is_empty());
        assert!(lookup.collection_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_page_bound_respected() {
        let pages: Vec<Vec<i64>> = (0..10).map(|p| vec![p]).collect();
        let membership = (0..10).map(|m| (m, m + 100)).collect();
        let lookup = FakeLookup {
            pages,
            membership,
            ..Default::default()
        };

        let found = CollectionScanner::new(20, 5).scan(&lookup).await;
        assert_eq!(ids(&found), vec![100, 101, 102, 103, 104]);
    }

    #[tokio::test]
    async fn test_zero_cap_does_nothing() {
        let lookup = FakeLookup {
            unlimited: true,
            ..Default::default()
        };

        assert!(CollectionScanner::new(0, 5).scan(&lookup).await.is_empty());
        assert!(lookup.collection_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parts_sorted_by_release_date() {
        let collection: TmdbCollection = serde_json::from_str(
            r#"{"id":1,"name":"Trilogy","overview":"","parts":[
                {"id":3,"title":"Third","release_date":"2003-11-05"},
                {"id":9,"title":"Announced","release_date":""},
                {"id":1,"title":"First","release_date":"1999-03-31"}
            ]}"#,
        )
        .unwrap();

        let grouping = Grouping::from(collection);
        let order: Vec<_> = grouping.parts.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![1, 3, 9]);
        assert_eq!(grouping.overview, None);
    }
}
