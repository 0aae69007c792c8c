use serde::{Deserialize, Serialize};

use super::repo_types::WatchlistEntry;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistChanged {
    pub success: bool,
    pub message: &'static str,
    pub watchlist: Vec<WatchlistEntry>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub watchlist: Vec<WatchlistEntry>,
}
