//! Integration tests for the browsing, detail and player endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_on, build_test_app_with, get, login, post_json,
    test_config, FakeCatalog, FlakyStore, ADMIN_PASSWORD,
};
use serde_json::json;

#[tokio::test]
async fn home_page_for_anonymous_caller() {
    let app = build_test_app().await;
    let res = get(&app.router, "/", None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["trending"].as_array().unwrap().len(), 2);
    assert_eq!(body["hero"]["id"], 550);
    assert_eq!(body["top_rated"][0]["media_type"], "movie");
    assert!(body["watchlist"].as_array().unwrap().is_empty());
    assert!(body["user"].is_null());
    assert_eq!(body["image_base"], "https://image.tmdb.org/t/p/w500");
}

#[tokio::test]
async fn home_page_includes_the_callers_watchlist() {
    let app = build_test_app().await;
    let cookie = login(&app.router, "admin", ADMIN_PASSWORD).await;
    post_json(
        &app.router,
        "/watchlist/add",
        &json!({ "id": 550, "title": "Fight Club" }),
        Some(&cookie),
    )
    .await;

    let body = body_json(get(&app.router, "/", Some(&cookie)).await).await;
    assert_eq!(body["user"], "admin");
    assert_eq!(body["watchlist"][0]["id"], 550);
}

#[tokio::test]
async fn unreachable_catalog_still_renders() {
    let app = build_test_app_with(test_config(), FakeCatalog { empty: true }).await;

    let body = body_json(get(&app.router, "/", None).await).await;
    assert!(body["trending"].as_array().unwrap().is_empty());
    assert!(body["hero"].is_null());

    let res = get(&app.router, "/api/search?q=anything", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_json(res).await["results"]
        .as_array()
        .unwrap()
        .is_empty());

    let res = get(&app.router, "/movie/550", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_search_skips_the_catalog() {
    let app = build_test_app().await;
    let body = body_json(get(&app.router, "/api/search?q=", None).await).await;
    assert_eq!(body, json!({ "results": [] }));

    let body = body_json(get(&app.router, "/api/search?q=fight", None).await).await;
    assert_eq!(body["results"][0]["title"], "Fight Club");
}

#[tokio::test]
async fn movie_details_mark_watchlist_membership() {
    let app = build_test_app().await;

    let body = body_json(get(&app.router, "/api/movie/550", None).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["movie"]["title"], "Fight Club");
    assert_eq!(body["movie"]["providers"][0]["provider_name"], "Netflix");
    assert_eq!(body["movie"]["in_watchlist"], false);

    let cookie = login(&app.router, "admin", ADMIN_PASSWORD).await;
    post_json(
        &app.router,
        "/watchlist/add",
        &json!({ "id": 550, "title": "Fight Club" }),
        Some(&cookie),
    )
    .await;
    let body = body_json(get(&app.router, "/movie/550", Some(&cookie)).await).await;
    assert_eq!(body["movie"]["in_watchlist"], true);
}

#[tokio::test]
async fn unknown_titles_are_404() {
    let app = build_test_app().await;

    let res = get(&app.router, "/movie/1", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["message"], "Movie not found");

    let res = get(&app.router, "/api/tv/1", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["message"], "TV series not found");

    let res = get(&app.router, "/watch/movie/1", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn player_descriptors() {
    let app = build_test_app().await;

    let movie = body_json(get(&app.router, "/watch/movie/550", None).await).await;
    assert_eq!(movie["tmdb_id"], 550);
    assert_eq!(movie["media_type"], "movie");
    assert!(movie.get("season").is_none());

    let episode = body_json(get(&app.router, "/watch/tv/1399/2/5", None).await).await;
    assert_eq!(episode["media_type"], "tv");
    assert_eq!(episode["season"], 2);
    assert_eq!(episode["episode"], 5);
    assert_eq!(episode["total_seasons"], 1);
}

#[tokio::test]
async fn user_store_failure_is_not_treated_as_anonymous() {
    use std::sync::atomic::Ordering;

    let app = build_test_app_on(test_config(), FlakyStore::new().await).await;
    let cookie = login(&app.router, "admin", ADMIN_PASSWORD).await;
    app.store.users_down.store(true, Ordering::SeqCst);

    let res = get(&app.router, "/", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await["message"], "Internal server error");

    let res = get(&app.router, "/movie/550", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // without a session the store is never consulted
    let res = get(&app.router, "/", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}
