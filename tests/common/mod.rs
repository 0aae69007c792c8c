#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use devopsflix::app::build_app;
use devopsflix::auth::repo::UserRepo;
use devopsflix::auth::repo_types::{NewUser, StoredPassword, User};
use devopsflix::catalog::client::Catalog;
use devopsflix::catalog::dto::{MediaDetails, MediaKind, MediaSummary, Provider};
use devopsflix::config::{
    AppConfig, DatabaseConfig, ServerConfig, SessionConfig, TmdbConfig,
};
use devopsflix::db::{Database, StoreHealth};
use devopsflix::memory::MemoryStore;
use devopsflix::state::AppState;
use devopsflix::watchlist::repo::WatchlistStore;
use devopsflix::watchlist::repo_types::{NewEntry, WatchlistEntry};

pub const ADMIN_PASSWORD: &str = "123";

/// Catalog stand-in: one known movie, one known series, everything else missing.
#[derive(Default)]
pub struct FakeCatalog {
    pub empty: bool,
}

pub fn summary(id: i64, title: &str, kind: MediaKind) -> MediaSummary {
    MediaSummary {
        id,
        title: title.into(),
        media_type: kind,
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        overview: String::new(),
        vote_average: 7.5,
        release_date: None,
    }
}

fn details(id: i64, title: &str, kind: MediaKind) -> MediaDetails {
    MediaDetails {
        id,
        media_type: kind,
        title: title.into(),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        release_date: None,
        runtime: None,
        vote_average: 8.0,
        vote_count: 10,
        genres: vec!["Drama".into()],
        tagline: None,
        status: None,
        budget: None,
        revenue: None,
        number_of_seasons: None,
        number_of_episodes: None,
        trailer_key: None,
        cast: vec![],
        directors: vec![],
        writers: vec![],
        providers: vec![],
        in_watchlist: false,
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn trending(&self) -> Vec<MediaSummary> {
        if self.empty {
            return vec![];
        }
        vec![
            summary(550, "Fight Club", MediaKind::Movie),
            summary(1399, "Some Series", MediaKind::Tv),
        ]
    }

    async fn top_rated(&self) -> Vec<MediaSummary> {
        if self.empty {
            return vec![];
        }
        vec![summary(238, "The Godfather", MediaKind::Movie)]
    }

    async fn search(&self, query: &str) -> Vec<MediaSummary> {
        if self.empty {
            return vec![];
        }
        self.trending()
            .await
            .into_iter()
            .filter(|m| m.title.to_lowercase().contains(&query.to_lowercase()))
            .collect()
    }

    async fn details(&self, kind: MediaKind, id: i64) -> Option<MediaDetails> {
        match (kind, id) {
            _ if self.empty => None,
            (MediaKind::Movie, 550) => Some(details(550, "Fight Club", kind)),
            (MediaKind::Tv, 1399) => Some(details(1399, "Some Series", kind)),
            _ => None,
        }
    }

    async fn watch_providers(&self, _kind: MediaKind, _id: i64) -> Vec<Provider> {
        if self.empty {
            return vec![];
        }
        vec![Provider {
            provider_name: "Netflix".into(),
            logo_path: None,
        }]
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig::Memory,
        tmdb: TmdbConfig::default(),
        session: SessionConfig {
            secret: Some("integration-test-secret-0123456789abcdef".into()),
            ttl_secs: 3600,
            secure_cookies: false,
        },
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            rate_limit_per_minute: 0,
        },
        default_admin_password: ADMIN_PASSWORD.into(),
    }
}

pub struct TestApp<S = MemoryStore> {
    pub router: Router,
    pub store: Arc<S>,
}

pub async fn build_test_app_with(config: AppConfig, catalog: FakeCatalog) -> TestApp {
    let store = Arc::new(
        MemoryStore::with_default_user(&config.default_admin_password)
            .await
            .unwrap(),
    );
    let state = AppState::from_parts(config, store.clone(), Arc::new(catalog));
    TestApp {
        router: build_app(state),
        store,
    }
}

pub async fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), FakeCatalog::default()).await
}

/// Same router over a fresh in-memory SQLite database.
pub async fn build_test_app_sql() -> TestApp<Database> {
    let mut config = test_config();
    config.database = DatabaseConfig::Sqlite {
        path: ":memory:".into(),
    };
    let db = Database::in_memory().await.unwrap();
    db.init_schema(&config.default_admin_password).await.unwrap();
    build_test_app_on(config, db).await
}

pub async fn build_test_app_on<S>(config: AppConfig, store: S) -> TestApp<S>
where
    S: UserRepo + WatchlistStore + StoreHealth + 'static,
{
    let store = Arc::new(store);
    let state = AppState::from_parts(config, store.clone(), Arc::new(FakeCatalog::default()));
    TestApp {
        router: build_app(state),
        store,
    }
}

/// Memory store whose user lookups can be switched to failing.
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub users_down: AtomicBool,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: MemoryStore::with_default_user(ADMIN_PASSWORD).await.unwrap(),
            users_down: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl UserRepo for FlakyStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        if self.users_down.load(Ordering::SeqCst) {
            anyhow::bail!("user store unreachable");
        }
        self.inner.find_by_username(username).await
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<Option<User>> {
        self.inner.create(new_user).await
    }

    async fn update_password(
        &self,
        user_id: i64,
        password: &StoredPassword,
    ) -> anyhow::Result<()> {
        self.inner.update_password(user_id, password).await
    }
}

#[async_trait]
impl WatchlistStore for FlakyStore {
    async fn add(&self, user_id: i64, entry: NewEntry) -> anyhow::Result<bool> {
        self.inner.add(user_id, entry).await
    }

    async fn remove(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool> {
        self.inner.remove(user_id, movie_id).await
    }

    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<WatchlistEntry>> {
        self.inner.list(user_id).await
    }

    async fn contains(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool> {
        self.inner.contains(user_id, movie_id).await
    }
}

#[async_trait]
impl StoreHealth for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &Value,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_form(app: &Router, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// `name=value` of the first `Set-Cookie` header, ready to send back.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(|s| s.trim().to_string())
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = post_form(
        app,
        "/login",
        &[("username", username), ("password", password)],
    )
    .await;
    assert!(
        response.status().is_redirection(),
        "login failed with {}",
        response.status()
    );
    session_cookie(&response).expect("login should set a session cookie")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
