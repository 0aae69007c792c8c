use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tracing::info;

use crate::auth::{repo::UserRepo, session::signing_key};
use crate::catalog::client::{Catalog, TmdbClient};
use crate::config::{AppConfig, DatabaseConfig};
use crate::db::{Database, StoreHealth};
use crate::memory::MemoryStore;
use crate::rate_limit::RateLimiter;
use crate::watchlist::repo::WatchlistStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub watchlist: Arc<dyn WatchlistStore>,
    pub store: Arc<dyn StoreHealth>,
    pub catalog: Arc<dyn Catalog>,
    pub key: Key,
    pub limiter: RateLimiter,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = Arc::new(TmdbClient::new(&config.tmdb)?);

        match &config.database {
            DatabaseConfig::Memory => {
                let store = Arc::new(
                    MemoryStore::with_default_user(&config.default_admin_password).await?,
                );
                info!("using in-memory store");
                Ok(Self::from_parts(config, store, catalog))
            }
            db_config => {
                let db = Database::connect(db_config).await?;
                db.init_schema(&config.default_admin_password).await?;
                info!(backend = db.backend().name(), "database ready");
                Ok(Self::from_parts(config, Arc::new(db), catalog))
            }
        }
    }

    /// One store serves users, watchlists and health checks.
    pub fn from_parts<S>(config: AppConfig, store: Arc<S>, catalog: Arc<dyn Catalog>) -> Self
    where
        S: UserRepo + WatchlistStore + StoreHealth + 'static,
    {
        let key = signing_key(&config.session);
        let limiter = RateLimiter::per_minute(config.server.rate_limit_per_minute);
        Self {
            config: Arc::new(config),
            users: store.clone(),
            watchlist: store.clone(),
            store,
            catalog,
            key,
            limiter,
        }
    }
}
