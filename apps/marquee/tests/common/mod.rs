//! Test infrastructure for Marquee integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` backed by a
//! canned TMDB server on a local port, so every route runs against the real
//! client code.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_test::TestServer;
use axum_extra::extract::cookie::Cookie;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use marquee::config::{CarouselConfig, Config, TmdbConfig};
use marquee::services::TmdbClient;
use marquee::session::SESSION_COOKIE;
use marquee::{build_router, AppState};

/// Movie lists report far more pages than TMDB lets anyone reach.
pub const MOVIE_TOTAL_PAGES: u32 = 1000;
pub const TV_TOTAL_PAGES: u32 = 3;
pub const RESULTS_PER_PAGE: i64 = 5;

/// Test application wrapper around axum_test::TestServer.
pub struct TestApp {
    server: TestServer,
    upstream_failing: Arc<AtomicBool>,
    mock: Option<JoinHandle<()>>,
}

impl TestApp {
    /// Create a test application wired to the mock TMDB server.
    pub async fn new() -> Self {
        let upstream_failing = Arc::new(AtomicBool::new(false));
        let (base_url, mock) = spawn_mock_tmdb(Arc::clone(&upstream_failing)).await;

        let config = Config {
            tmdb: TmdbConfig {
                api_key: Some("test-api-key".to_string()),
                base_url,
                timeout_secs: 5,
                ..Default::default()
            },
            carousel: test_carousel(),
            ..Default::default()
        };

        let client = TmdbClient::new_shared("test-api-key".to_string(), &config.tmdb)
            .expect("Failed to create TMDB client");
        let state = AppState::new(config, Some(client)).expect("Failed to create app state");

        Self {
            server: TestServer::new(build_router(state)).expect("Failed to create test server"),
            upstream_failing,
            mock: Some(mock),
        }
    }

    /// Create a test application with no TMDB API key configured.
    pub async fn without_tmdb() -> Self {
        let config = Config {
            carousel: test_carousel(),
            ..Default::default()
        };
        let state = AppState::new(config, None).expect("Failed to create app state");

        Self {
            server: TestServer::new(build_router(state)).expect("Failed to create test server"),
            upstream_failing: Arc::new(AtomicBool::new(true)),
            mock: None,
        }
    }

    /// Get a reference to the test server.
    ///
    /// Use this to make HTTP requests:
    /// ```ignore
    /// let response = app.server().get("/health").await;
    /// ```
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    /// Make every mock TMDB endpoint answer 500 until switched back.
    pub fn fail_upstream(&self, failing: bool) {
        self.upstream_failing.store(failing, Ordering::SeqCst);
    }

    /// Load a page and return the session cookie it set.
    pub async fn start_session(&self, path: &str) -> Cookie<'static> {
        let response = self.server.get(path).await;
        response.assert_status_ok();
        response.cookie(SESSION_COOKIE)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(mock) = self.mock.take() {
            mock.abort();
        }
    }
}

/// Nothing advances on its own during a test, and commands are accepted right after mount.
fn test_carousel() -> CarouselConfig {
    CarouselConfig {
        auto_advance_secs: 3600,
        grace_ms: 0,
        ..Default::default()
    }
}

async fn spawn_mock_tmdb(failing: Arc<AtomicBool>) -> (String, JoinHandle<()>) {
    let app = Router::new()
        .route("/trending/movie/day", get(trending_movies))
        .route("/trending/tv/day", get(trending_tv))
        .route("/movie/:id", get(movie))
        .route("/movie/:id/similar", get(movie_similar))
        .route("/movie/:id/images", get(images))
        .route("/tv/:id", get(tv))
        .route("/tv/:id/similar", get(tv_similar))
        .route("/tv/:id/images", get(images))
        .route("/tv/:id/season/:season", get(season))
        .route("/discover/tv", get(discover_tv))
        .route("/search/multi", get(search_multi))
        .route("/search/collection", get(search_collection))
        .route("/collection/:id", get(collection))
        .layer(middleware::from_fn_with_state(failing, fail_switch));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock TMDB server");
    let addr = listener.local_addr().expect("Mock TMDB server has no address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}", addr), handle)
}

async fn fail_switch(State(failing): State<Arc<AtomicBool>>, request: Request, next: Next) -> Response {
    if failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response();
    }
    next.run(request).await
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
    query: Option<String>,
    sort_by: Option<String>,
}

impl PageParams {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

fn movie_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {}", id),
        "overview": format!("Overview of movie {}", id),
        "release_date": format!("{}-05-01", 1990 + id % 30),
        "poster_path": format!("/poster-{}.jpg", id),
        "backdrop_path": format!("/backdrop-{}.jpg", id),
        "vote_average": 7.5,
        "genre_ids": [28, 12, 878]
    })
}

fn show_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Show {}", id),
        "overview": format!("Overview of show {}", id),
        "first_air_date": "2015-09-10",
        "poster_path": format!("/poster-{}.jpg", id),
        "backdrop_path": format!("/backdrop-{}.jpg", id),
        "vote_average": 8.1,
        "genre_ids": [16, 18],
        "origin_country": ["JP"]
    })
}

/// Page `page` of a list: ids `page*100+1 ..= page*100+5`.
fn list_page(page: u32, total_pages: u32, item: fn(i64) -> Value) -> Json<Value> {
    let base = i64::from(page) * 100;
    let results: Vec<Value> = (1..=RESULTS_PER_PAGE).map(|i| item(base + i)).collect();
    Json(json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": i64::from(total_pages) * RESULTS_PER_PAGE * 4
    }))
}

async fn trending_movies() -> Json<Value> {
    list_page(1, 10, movie_json)
}

/// Trending shows live on page 9: ids 901..=905.
async fn trending_tv() -> Json<Value> {
    list_page(9, 10, show_json)
}

async fn movie(Path(segment): Path<String>, Query(params): Query<PageParams>) -> Response {
    match segment.parse::<i64>() {
        Ok(404) => (StatusCode::NOT_FOUND, Json(json!({"status_code": 34}))).into_response(),
        Ok(id) => Json(movie_details(id)).into_response(),
        Err(_) => list_page(params.page(), MOVIE_TOTAL_PAGES, movie_json).into_response(),
    }
}

/// Ids ending in 1 or 2 share collection 10, ids ending in 3 own one.
fn movie_details(id: i64) -> Value {
    let collection = match id % 10 {
        1 | 2 => json!({"id": 10, "name": "Shared Saga"}),
        3 => json!({"id": id, "name": format!("Collection {}", id)}),
        _ => Value::Null,
    };

    let mut details = movie_json(id);
    let extra = json!({
        "runtime": 136,
        "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
        "tagline": "Welcome to the real world.",
        "status": "Released",
        "budget": 63_000_000,
        "revenue": 463_517_383,
        "original_language": "en",
        "belongs_to_collection": collection
    });
    if let (Some(target), Value::Object(extra)) = (details.as_object_mut(), extra) {
        target.extend(extra);
    }
    details
}

async fn movie_similar() -> Json<Value> {
    list_page(7, 1, movie_json)
}

async fn images() -> Json<Value> {
    Json(json!({
        "logos": [
            {"file_path": "/logo-fr.png", "iso_639_1": "fr"},
            {"file_path": "/logo-en.png", "iso_639_1": "en"}
        ]
    }))
}

async fn tv(Path(segment): Path<String>, Query(params): Query<PageParams>) -> Response {
    match segment.parse::<i64>() {
        Ok(404) => (StatusCode::NOT_FOUND, Json(json!({"status_code": 34}))).into_response(),
        Ok(id) => Json(show_details(id)).into_response(),
        Err(_) => list_page(params.page(), TV_TOTAL_PAGES, show_json).into_response(),
    }
}

fn show_details(id: i64) -> Value {
    let mut details = show_json(id);
    let extra = json!({
        "genres": [{"id": 18, "name": "Drama"}],
        "tagline": "Winter is coming.",
        "status": "Ended",
        "number_of_seasons": 2,
        "number_of_episodes": 6,
        "episode_run_time": [57],
        "original_language": "ja",
        "seasons": [
            {"id": 1, "name": "Specials", "season_number": 0, "episode_count": 1},
            {"id": 2, "name": "Season 1", "season_number": 1, "episode_count": 3, "air_date": "2015-09-10"},
            {"id": 3, "name": "Season 2", "season_number": 2, "episode_count": 3, "air_date": "2016-09-10"}
        ]
    });
    if let (Some(target), Value::Object(extra)) = (details.as_object_mut(), extra) {
        target.extend(extra);
    }
    details
}

async fn tv_similar() -> Json<Value> {
    list_page(8, 1, show_json)
}

async fn season(Path((id, season)): Path<(i64, i32)>) -> Response {
    if id == 404 || season > 2 {
        return (StatusCode::NOT_FOUND, Json(json!({"status_code": 34}))).into_response();
    }

    let episodes: Vec<Value> = (1..=3)
        .map(|n| {
            json!({
                "id": id * 1000 + i64::from(season) * 10 + n,
                "name": format!("Episode {} of season {}", n, season),
                "overview": "Things happen.",
                "episode_number": n,
                "season_number": season,
                "still_path": format!("/still-{}.jpg", n),
                "vote_average": 7.9,
                "runtime": 52
            })
        })
        .collect();

    Json(json!({
        "id": id * 10 + i64::from(season),
        "name": format!("Season {}", season),
        "season_number": season,
        "episodes": episodes
    }))
    .into_response()
}

async fn discover_tv(Query(params): Query<PageParams>) -> Response {
    if params.sort_by.is_none() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    list_page(params.page(), 2, show_json).into_response()
}

async fn search_multi(Query(params): Query<PageParams>) -> Json<Value> {
    let query = params.query.clone().unwrap_or_default();
    let mut movie = movie_json(550);
    let mut show = show_json(1399);
    if let Some(m) = movie.as_object_mut() {
        m.insert("media_type".into(), json!("movie"));
        m.insert("title".into(), json!(format!("{} the movie", query)));
    }
    if let Some(s) = show.as_object_mut() {
        s.insert("media_type".into(), json!("tv"));
    }
    let person = json!({"id": 287, "media_type": "person", "name": "Brad Pitt", "known_for": []});

    Json(json!({
        "page": params.page(),
        "results": [movie, person, show],
        "total_pages": 2,
        "total_results": 30
    }))
}

async fn search_collection(Query(params): Query<PageParams>) -> Json<Value> {
    Json(json!({
        "page": params.page(),
        "results": [{"id": 10, "name": "Shared Saga"}],
        "total_pages": 800,
        "total_results": 15_987
    }))
}

async fn collection(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({"status_code": 34}))).into_response();
    }

    let (name, parts) = if id == 10 {
        let mut undated = movie_json(102);
        if let Some(m) = undated.as_object_mut() {
            m.insert("release_date".into(), json!(""));
        }
        ("Shared Saga".to_string(), vec![movie_json(111), undated, movie_json(101)])
    } else {
        (format!("Collection {}", id), vec![movie_json(id)])
    };

    Json(json!({
        "id": id,
        "name": name,
        "overview": format!("All of {}", name),
        "poster_path": "/collection.jpg",
        "backdrop_path": "/collection-backdrop.jpg",
        "parts": parts
    }))
    .into_response()
}
