use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One saved title. Serialized with the catalog id as `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WatchlistEntry {
    #[serde(rename = "id")]
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub added_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
}
