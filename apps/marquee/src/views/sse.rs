//! Server-Sent Events for the featured hero
//!
//! The stream follows the session carousel's snapshots and renders each one
//! as the hero fragment for HTMX to swap in.

use std::convert::Infallible;
use std::pin::Pin;
use std::time::Duration;

use askama::Template;
use async_stream::stream;
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use axum_extra::extract::CookieJar;
use futures::Stream;

use crate::AppState;

use super::hero::HeroTemplate;

type EventStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

/// SSE stream of hero fragments, one per carousel state change
pub async fn hero_stream(State(state): State<AppState>, cookies: CookieJar) -> Response {
    let carousel = match state.sessions.get(&cookies).await {
        Some(session) => session.carousel().await,
        None => None,
    };

    // No carousel to follow: say so once and let the client give up
    let Some(carousel) = carousel else {
        let empty_stream: EventStream = Box::pin(stream! {
            yield Ok(Event::default().event("error").data("No hero mounted"));
        });
        return Sse::new(empty_stream)
            .keep_alive(KeepAlive::default())
            .into_response();
    };

    let mut rx = carousel.subscribe();
    // The stream must not keep a replaced carousel alive
    drop(carousel);

    let stream: EventStream = Box::pin(stream! {
        // Ends when the carousel is disposed and its sender dropped
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let template = HeroTemplate::from_snapshot(&state, &snapshot);

            match template.render() {
                Ok(html) => yield Ok(Event::default().event("hero").data(html)),
                Err(e) => tracing::warn!("Hero render error: {}", e),
            }
        }
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
        .into_response()
}
