//! Integration tests for the JSON endpoints: embeds, collections and search.

mod common;

use common::TestApp;
use serde_json::Value;

#[tokio::test]
async fn test_embed_movie_defaults_to_first_provider() {
    let app = TestApp::new().await;
    let response = app.server().get("/api/embed/550").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["target"]["type"], "movie");
    assert_eq!(body["target"]["id"], 550);
    assert_eq!(body["embed"]["provider"], "v1");
    assert_eq!(body["embed"]["url"], "https://vidsrc.icu/embed/movie/550");
    assert_eq!(body["providers"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_embed_episode_needs_season_and_episode() {
    let app = TestApp::new().await;

    let response = app
        .server()
        .get("/api/embed/1399")
        .add_query_param("season", 2)
        .await;
    let body: Value = response.json();
    assert_eq!(body["target"]["type"], "movie");

    let response = app
        .server()
        .get("/api/embed/1399")
        .add_query_param("season", 2)
        .add_query_param("episode", 5)
        .add_query_param("source", "4k")
        .await;
    let body: Value = response.json();
    assert_eq!(body["target"]["type"], "episode");
    assert_eq!(body["target"]["season"], 2);
    assert_eq!(body["target"]["episode"], 5);
    assert_eq!(body["embed"]["provider"], "4k");
    assert_eq!(body["embed"]["url"], "https://autoembed.cc/tv/tmdb/1399-2-5");
}

#[tokio::test]
async fn test_embed_provider_templates_stay_private() {
    let app = TestApp::new().await;
    let body: Value = app.server().get("/api/embed/550").await.json();

    let provider = &body["providers"][0];
    assert_eq!(provider["id"], "v1");
    assert!(provider.get("movie_template").is_none());
    assert!(provider.get("episode_template").is_none());
}

#[tokio::test]
async fn test_collections_scan() {
    let app = TestApp::new().await;
    let response = app.server().get("/api/collections").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<i64> = body["collections"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_i64())
        .collect();
    // Shared collection appears once, in discovery order
    assert_eq!(ids, vec![10, 103, 203, 303, 403, 503]);
    assert_eq!(body["total_pages"], 500);
    assert_eq!(body["total_results"], 15987);
}

#[tokio::test]
async fn test_collections_filter() {
    let app = TestApp::new().await;
    let body: Value = app
        .server()
        .get("/api/collections")
        .add_query_param("q", "collection 2")
        .await
        .json();

    let names: Vec<&str> = body["collections"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Collection 203"]);
}

#[tokio::test]
async fn test_collections_upstream_down() {
    let app = TestApp::new().await;
    app.fail_upstream(true);

    let response = app.server().get("/api/collections").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["collections"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["total_pages"], 347);
    assert_eq!(body["total_results"], 6928);
}

#[tokio::test]
async fn test_search_json() {
    let app = TestApp::new().await;
    let response = app
        .server()
        .get("/api/search")
        .add_query_param("q", "dune")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["query"], "dune");
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_more"], true);

    let kinds: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["movie", "series"]);
}

#[tokio::test]
async fn test_search_upstream_down_is_empty() {
    let app = TestApp::new().await;
    app.fail_upstream(true);

    let body: Value = app
        .server()
        .get("/api/search")
        .add_query_param("q", "dune")
        .await
        .json();

    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["has_more"], false);
}
