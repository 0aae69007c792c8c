use anyhow::Context;
use async_trait::async_trait;
use sqlx::FromRow;
use tracing::{info, warn};

use crate::db::{is_unique_violation, Database, Fetch};
use crate::watchlist::repo_types::{NewEntry, WatchlistEntry};

/// Per-user watchlist storage.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// `Ok(false)` when the title is already on the user's list.
    async fn add(&self, user_id: i64, entry: NewEntry) -> anyhow::Result<bool>;

    /// `Ok(false)` when there was nothing to remove.
    async fn remove(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool>;

    /// Newest first.
    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<WatchlistEntry>>;

    async fn contains(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool>;
}

#[async_trait]
impl WatchlistStore for Database {
    async fn add(&self, user_id: i64, entry: NewEntry) -> anyhow::Result<bool> {
        let res = self
            .execute_query(
                "INSERT INTO watchlist (user_id, movie_id, title, poster_path) VALUES (?, ?, ?, ?)",
                vec![
                    user_id.into(),
                    entry.movie_id.into(),
                    entry.title.as_str().into(),
                    entry.poster_path.into(),
                ],
                Fetch::None,
            )
            .await;

        match res {
            Ok(_) => {
                info!(user_id, movie_id = entry.movie_id, title = %entry.title, "watchlist add");
                Ok(true)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(user_id, movie_id = entry.movie_id, "movie already in watchlist");
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert watchlist entry")),
        }
    }

    async fn remove(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool> {
        let removed = self
            .execute_query(
                "DELETE FROM watchlist WHERE user_id = ? AND movie_id = ?",
                vec![user_id.into(), movie_id.into()],
                Fetch::None,
            )
            .await
            .context("delete watchlist entry")?
            .rows_affected()
            > 0;

        if removed {
            info!(user_id, movie_id, "watchlist remove");
        }
        Ok(removed)
    }

    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<WatchlistEntry>> {
        let rows = self
            .execute_query(
                r#"
                SELECT movie_id, title, poster_path, CAST(added_at AS TEXT) AS added_at
                FROM watchlist
                WHERE user_id = ?
                ORDER BY added_at DESC, id DESC
                "#,
                vec![user_id.into()],
                Fetch::All,
            )
            .await
            .context("list watchlist")?
            .into_rows();

        rows.iter()
            .map(|r| WatchlistEntry::from_row(r).map_err(Into::into))
            .collect()
    }

    async fn contains(&self, user_id: i64, movie_id: i64) -> anyhow::Result<bool> {
        let row = self
            .execute_query(
                "SELECT id FROM watchlist WHERE user_id = ? AND movie_id = ?",
                vec![user_id.into(), movie_id.into()],
                Fetch::One,
            )
            .await
            .context("look up watchlist entry")?
            .into_row();
        Ok(row.is_some())
    }
}
