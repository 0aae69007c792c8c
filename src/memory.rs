//! Process-local store for tests and `DB_BACKEND=memory`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::sync::RwLock;

use crate::auth::{
    password::hash_password,
    repo::UserRepo,
    repo_types::{NewUser, StoredPassword, User},
};
use crate::db::{StoreHealth, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_USERNAME};
use crate::watchlist::{
    repo::WatchlistStore,
    repo_types::{NewEntry, WatchlistEntry},
};

#[derive(Default)]
pub struct MemoryStore {
    next_user_id: AtomicI64,
    users: RwLock<Vec<User>>,
    // per user, oldest first
    watchlists: RwLock<HashMap<i64, Vec<WatchlistEntry>>>,
}

fn now_text() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the default account already present, hashed.
    pub async fn with_default_user(password: &str) -> anyhow::Result<Self> {
        let store = Self::new();
        store
            .create(NewUser {
                username: DEFAULT_ADMIN_USERNAME.into(),
                email: DEFAULT_ADMIN_EMAIL.into(),
                password: StoredPassword::Hashed(hash_password(password)?),
            })
            .await?;
        Ok(store)
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == new_user.username) {
            return Ok(None);
        }
        let user = User {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
            created_at: now_text(),
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn update_password(
        &self,
        user_id: i64,
        password: &StoredPassword,
    ) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password = password.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn add(&self, user_id: i64, entry: NewEntry) -> anyhow::Result<bool> {
        let mut lists = self.watchlists.write().await;
        let list = lists.entry(user_id).or_default();
        if list.iter().any(|e| e.movie_id == entry.movie_id) {
            return Ok(false);
        }
        list.push(WatchlistEntry {
            movie_id: entry.movie_id,
            title: entry.title,
            poster_path: entry.poster_path,
            added_at: now_text(),
        });
        Ok(true)
    }

    async fn remove(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool> {
        let mut lists = self.watchlists.write().await;
        let Some(list) = lists.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|e| e.movie_id != movie_id);
        Ok(list.len() < before)
    }

    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<WatchlistEntry>> {
        let lists = self.watchlists.read().await;
        Ok(lists
            .get(&user_id)
            .map(|l| l.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn contains(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool> {
        let lists = self.watchlists.read().await;
        Ok(lists
            .get(&user_id)
            .is_some_and(|l| l.iter().any(|e| e.movie_id == movie_id)))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
