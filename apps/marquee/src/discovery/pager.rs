//! "Page N of category C" over a remote ranked list.
//!
//! The pager never holds a lock across a fetch. Mutating calls hand out a
//! [`FetchTicket`]; the caller fetches with it and passes the result back to
//! [`Pager::complete`]. Tickets carry a generation number, so a response that
//! arrives after the filter moved on is discarded instead of overwriting the
//! newer view.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use super::PageResult;
use crate::error::Result;

/// A remote list that can be fetched one page at a time.
#[async_trait]
pub trait PageSource<C, T>: Send + Sync {
    async fn fetch_page(&self, category: C, page: u32) -> Result<PageResult<T>>;
}

/// Active category and page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterState<C> {
    pub category: C,
    pub page: u32,
}

/// Emitted synchronously whenever the requested page changes, before any fetch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageChange<C> {
    pub category: C,
    pub page: u32,
}

/// Authorization to apply one fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket<C> {
    generation: u64,
    filter: FilterState<C>,
}

impl<C: Copy> FetchTicket<C> {
    pub fn filter(&self) -> FilterState<C> {
        self.filter
    }
}

/// What a grid renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<C, T> {
    pub category: C,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub loading: bool,
    pub items: Vec<T>,
}

pub struct Pager<C, T> {
    filter: FilterState<C>,
    items: Vec<T>,
    total_pages: u32,
    total_results: u32,
    loading: bool,
    generation: u64,
    max_total_pages: u32,
    changes: broadcast::Sender<PageChange<C>>,
}

impl<C, T> Pager<C, T>
where
    C: Copy + Eq + Debug,
    T: Clone,
{
    /// An empty pager on page 1 of `category`.
    pub fn new(category: C, max_total_pages: u32) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            filter: FilterState { category, page: 1 },
            items: Vec::new(),
            total_pages: 1,
            total_results: 0,
            loading: false,
            generation: 0,
            max_total_pages,
            changes,
        }
    }

    /// A pager seeded with a page the loader already fetched.
    pub fn with_snapshot(category: C, initial: PageResult<T>, max_total_pages: u32) -> Self {
        let mut pager = Self::new(category, max_total_pages);
        pager.filter.page = initial.page.max(1);
        pager.apply(initial);
        pager
    }

    pub fn filter(&self) -> FilterState<C> {
        self.filter
    }

    pub fn view(&self) -> PageView<C, T> {
        PageView {
            category: self.filter.category,
            page: self.filter.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            loading: self.loading,
            items: self.items.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageChange<C>> {
        self.changes.subscribe()
    }

    /// Switch category and go back to page 1. Re-selecting the active category is ignored.
    pub fn set_category(&mut self, category: C) -> Option<FetchTicket<C>> {
        if category == self.filter.category {
            return None;
        }
        self.filter = FilterState { category, page: 1 };
        self.emit_change();
        Some(self.begin_fetch())
    }

    /// Move to `page` if it lies within `1..=total_pages`; otherwise nothing changes.
    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket<C>> {
        if page < 1 || page > self.total_pages {
            tracing::debug!(page, total_pages = self.total_pages, "Ignoring out-of-range page");
            return None;
        }
        self.filter.page = page;
        self.emit_change();
        Some(self.begin_fetch())
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale and the result was dropped.
    pub fn complete(&mut self, ticket: FetchTicket<C>, result: Result<PageResult<T>>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ?ticket.filter,
                current = ?self.filter,
                "Discarding stale page response"
            );
            return false;
        }

        match result {
            Ok(page) => self.apply(page),
            Err(e) => {
                tracing::warn!(
                    category = ?self.filter.category,
                    page = self.filter.page,
                    error = %e,
                    "Page fetch failed, showing empty page"
                );
                self.items.clear();
                self.loading = false;
            }
        }
        true
    }

    fn begin_fetch(&mut self) -> FetchTicket<C> {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            filter: self.filter,
        }
    }

    fn apply(&mut self, page: PageResult<T>) {
        let page = page.clamped(self.max_total_pages);
        self.items = page.items;
        self.total_pages = page.total_pages;
        self.total_results = page.total_results;
        self.loading = false;
    }

    fn emit_change(&self) {
        // Nobody listening is fine.
        let _ = self.changes.send(PageChange {
            category: self.filter.category,
            page: self.filter.page,
        });
    }
}

/// Fetch `ticket` from `source` and apply it to a shared pager.
///
/// The lock is released while the request is in flight.
pub async fn run_fetch<C, T, S>(pager: &Mutex<Pager<C, T>>, source: &S, ticket: FetchTicket<C>) -> bool
where
    C: Copy + Eq + Debug,
    T: Clone,
    S: PageSource<C, T> + ?Sized,
{
    let filter = ticket.filter();
    let result = source.fetch_page(filter.category, filter.page).await;
    pager.lock().await.complete(ticket, result)
}
