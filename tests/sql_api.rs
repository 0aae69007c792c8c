//! The HTTP scenarios again, this time over the SQLite store.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app_sql, get, login, post_form, post_json, ADMIN_PASSWORD};
use devopsflix::auth::repo::UserRepo;
use devopsflix::db::Fetch;
use serde_json::json;

#[tokio::test]
async fn duplicate_add_is_rejected_by_the_unique_constraint() {
    let app = build_test_app_sql().await;
    let cookie = login(&app.router, "admin", ADMIN_PASSWORD).await;
    let movie = json!({ "id": 99999, "title": "X", "poster_path": "/p.jpg" });

    let first = post_json(&app.router, "/watchlist/add", &movie, Some(&cookie)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = body_json(first).await;
    assert_eq!(body["watchlist"].as_array().unwrap().len(), 1);
    assert_eq!(body["watchlist"][0]["id"], 99999);
    assert_eq!(body["watchlist"][0]["poster_path"], "/p.jpg");

    let second = post_json(&app.router, "/watchlist/add", &movie, Some(&cookie)).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(second).await["message"]
        .as_str()
        .unwrap()
        .contains("already in watchlist"));

    let list = body_json(get(&app.router, "/watchlist", Some(&cookie)).await).await;
    assert_eq!(list["watchlist"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn remove_missing_is_404_and_leaves_the_list() {
    let app = build_test_app_sql().await;
    let cookie = login(&app.router, "admin", ADMIN_PASSWORD).await;
    post_json(
        &app.router,
        "/watchlist/add",
        &json!({ "id": 1, "title": "Kept" }),
        Some(&cookie),
    )
    .await;

    let res = post_json(
        &app.router,
        "/watchlist/remove",
        &json!({ "id": 2 }),
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = post_json(
        &app.router,
        "/watchlist/remove",
        &json!({ "id": 1 }),
        Some(&cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_json(res).await["watchlist"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn legacy_plaintext_row_is_upgraded_through_login() {
    let app = build_test_app_sql().await;
    app.store
        .execute_query(
            "INSERT INTO users (username, email, password) VALUES (?, ?, ?)",
            vec!["legacy".into(), "legacy@example.com".into(), "oldpass".into()],
            Fetch::None,
        )
        .await
        .unwrap();

    login(&app.router, "legacy", "oldpass").await;
    let user = app.store.find_by_username("legacy").await.unwrap().unwrap();
    assert!(user.password.is_hashed());

    login(&app.router, "legacy", "oldpass").await;
    let res = post_form(
        &app.router,
        "/login",
        &[("username", "legacy"), ("password", "wrong")],
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_writes_a_hashed_row_and_rejects_duplicates() {
    let app = build_test_app_sql().await;
    let form = [
        ("email", "new@example.com"),
        ("username", "newbie"),
        ("password", "secret1"),
        ("confirm_password", "secret1"),
    ];

    let res = post_form(&app.router, "/signup", &form).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let stored = app.store.find_by_username("newbie").await.unwrap().unwrap();
    assert!(stored.password.is_hashed());

    let res = post_form(&app.router, "/signup", &form).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["message"], "Username already exists");

    login(&app.router, "newbie", "secret1").await;
}

#[tokio::test]
async fn health_names_the_sql_backend() {
    let app = build_test_app_sql().await;
    let body = body_json(get(&app.router, "/health", None).await).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "sqlite");
}
