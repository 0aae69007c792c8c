use anyhow::Context;
use serde::Deserialize;

/// Which store backs users and watchlists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum DatabaseConfig {
    Sqlite { path: String },
    Postgres {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
    Memory,
}

impl DatabaseConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            DatabaseConfig::Sqlite { .. } => "sqlite",
            DatabaseConfig::Postgres { .. } => "postgres",
            DatabaseConfig::Memory => "memory",
        }
    }

    /// Connection URL understood by `sqlx::AnyPool`. `None` for the memory store.
    pub fn url(&self) -> Option<String> {
        match self {
            DatabaseConfig::Sqlite { path } if path == ":memory:" => {
                Some("sqlite::memory:".to_string())
            }
            DatabaseConfig::Sqlite { path } => Some(format!("sqlite://{}?mode=rwc", path)),
            DatabaseConfig::Postgres {
                host,
                port,
                user,
                password,
                name,
            } => Some(format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(user),
                urlencoding::encode(password),
                host,
                port,
                urlencoding::encode(name)
            )),
            DatabaseConfig::Memory => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base: String,
    pub timeout_secs: u64,
    pub watch_region: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".into(),
            image_base: "https://image.tmdb.org/t/p/w500".into(),
            timeout_secs: 10,
            watch_region: "SG".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Master secret for cookie signing. `None` means a random per-process key.
    pub secret: Option<String>,
    pub ttl_secs: i64,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub tmdb: TmdbConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
    pub default_admin_password: String,
}

pub const MIN_SECRET_LEN: usize = 32;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch process env.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let database = if non_empty("DB_BACKEND").as_deref() == Some("memory") {
            DatabaseConfig::Memory
        } else if let Some(host) = non_empty("DB_HOST") {
            DatabaseConfig::Postgres {
                host,
                port: parse_or("DB_PORT", non_empty("DB_PORT"), 5432)?,
                user: non_empty("DB_USER").context("DB_USER must be set when DB_HOST is set")?,
                password: get("DB_PASSWORD").unwrap_or_default(),
                name: non_empty("DB_NAME").context("DB_NAME must be set when DB_HOST is set")?,
            }
        } else {
            DatabaseConfig::Sqlite {
                path: non_empty("DB_PATH").unwrap_or_else(|| "devopsflix.db".into()),
            }
        };

        let defaults = TmdbConfig::default();
        let tmdb = TmdbConfig {
            api_key: non_empty("TMDB_API_KEY").unwrap_or_default(),
            base_url: non_empty("TMDB_BASE_URL").unwrap_or(defaults.base_url),
            image_base: non_empty("TMDB_IMAGE_BASE").unwrap_or(defaults.image_base),
            timeout_secs: parse_or(
                "TMDB_TIMEOUT_SECS",
                non_empty("TMDB_TIMEOUT_SECS"),
                defaults.timeout_secs,
            )?,
            watch_region: non_empty("WATCH_REGION").unwrap_or(defaults.watch_region),
        };

        let is_production = non_empty("APP_ENV").as_deref() == Some("production")
            || matches!(database, DatabaseConfig::Postgres { .. });

        let secret = non_empty("SECRET_KEY");
        if let Some(s) = &secret {
            anyhow::ensure!(
                s.len() >= MIN_SECRET_LEN,
                "SECRET_KEY must be at least {} bytes",
                MIN_SECRET_LEN
            );
        }
        let ttl_secs: i64 = parse_or("SESSION_TTL_SECS", non_empty("SESSION_TTL_SECS"), 3600)?;
        anyhow::ensure!(
            ttl_secs > 0,
            "SESSION_TTL_SECS must be positive, got {}",
            ttl_secs
        );
        let session = SessionConfig {
            secret,
            ttl_secs,
            secure_cookies: is_production,
        };

        let server = ServerConfig {
            host: non_empty("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("PORT", non_empty("PORT"), 5000)?,
            rate_limit_per_minute: parse_or(
                "RATE_LIMIT_PER_MINUTE",
                non_empty("RATE_LIMIT_PER_MINUTE"),
                120,
            )?,
        };

        Ok(Self {
            database,
            tmdb,
            session,
            server,
            default_admin_password: non_empty("DEFAULT_ADMIN_PASSWORD")
                .unwrap_or_else(|| "123".into()),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, v)),
        None => Ok(default),
    }
}
