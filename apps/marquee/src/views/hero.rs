//! Featured hero fragment and the carousel commands that swap it.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::discovery::{CarouselSnapshot, CarouselState, FeaturedItem};
use crate::AppState;

use super::utils::{HeroView, PreviewView};

#[derive(Template)]
#[template(path = "partials/hero.html")]
pub struct HeroTemplate {
    pub hero: Option<HeroView>,
    pub preview: Option<PreviewView>,
    pub active_index: usize,
    pub fading_to: Option<usize>,
    pub dots: Vec<HeroDot>,
    /// Prev/next/dots only make sense with more than one item.
    pub controls: bool,
}

pub struct HeroDot {
    pub index: usize,
    pub active: bool,
}

impl HeroTemplate {
    pub fn from_snapshot(state: &AppState, snapshot: &CarouselSnapshot<FeaturedItem>) -> Self {
        let fading_to = match snapshot.state {
            CarouselState::Transitioning { to, .. } => Some(to),
            CarouselState::Idle { .. } => None,
        };

        let active_index = snapshot.active_index.unwrap_or(0);

        Self {
            hero: snapshot.active.as_ref().map(|i| HeroView::from_item(state, i)),
            preview: snapshot
                .upcoming
                .as_ref()
                .filter(|_| snapshot.len > 1)
                .map(|i| PreviewView::from_item(state, i)),
            active_index,
            fading_to,
            dots: (0..snapshot.len)
                .map(|index| HeroDot {
                    index,
                    active: index == active_index,
                })
                .collect(),
            controls: snapshot.len > 1,
        }
    }

    pub fn empty() -> Self {
        Self {
            hero: None,
            preview: None,
            active_index: 0,
            fading_to: None,
            dots: Vec::new(),
            controls: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HeroCommand {
    Next,
    Previous,
    Select(usize),
}

async fn run_command(state: &AppState, cookies: &CookieJar, command: HeroCommand) -> Response {
    let carousel = match state.sessions.get(cookies).await {
        Some(session) => session.carousel().await,
        None => None,
    };
    let Some(carousel) = carousel else {
        tracing::debug!(?command, "Hero command without a mounted carousel");
        return HeroTemplate::empty().into_response();
    };

    let accepted = match command {
        HeroCommand::Next => carousel.next().await,
        HeroCommand::Previous => carousel.previous().await,
        HeroCommand::Select(index) => carousel.select(index).await,
    };
    tracing::debug!(?command, accepted, "Hero command");

    HeroTemplate::from_snapshot(state, &carousel.snapshot()).into_response()
}

/// POST /hero/next
pub async fn next(State(state): State<AppState>, cookies: CookieJar) -> Response {
    run_command(&state, &cookies, HeroCommand::Next).await
}

/// POST /hero/previous
pub async fn previous(State(state): State<AppState>, cookies: CookieJar) -> Response {
    run_command(&state, &cookies, HeroCommand::Previous).await
}

/// POST /hero/select/:index
pub async fn select(
    State(state): State<AppState>,
    cookies: CookieJar,
    Path(index): Path<usize>,
) -> Response {
    run_command(&state, &cookies, HeroCommand::Select(index)).await
}
