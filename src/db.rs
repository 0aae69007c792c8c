use std::borrow::Cow;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    any::{AnyPoolOptions, AnyRow},
    AnyPool,
};
use tracing::{debug, info, warn};

use crate::auth::{password::hash_password, repo_types::StoredPassword};
use crate::config::DatabaseConfig;

/// SQL dialect behind the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }
}

/// How many rows a statement should hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    None,
    One,
    All,
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    OptText(Option<String>),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        SqlParam::OptText(v)
    }
}

pub enum QueryOutput {
    Done { rows_affected: u64 },
    Row(Option<AnyRow>),
    Rows(Vec<AnyRow>),
}

impl QueryOutput {
    pub fn rows_affected(&self) -> u64 {
        match self {
            QueryOutput::Done { rows_affected } => *rows_affected,
            QueryOutput::Row(row) => row.is_some() as u64,
            QueryOutput::Rows(rows) => rows.len() as u64,
        }
    }

    pub fn into_row(self) -> Option<AnyRow> {
        match self {
            QueryOutput::Row(row) => row,
            QueryOutput::Rows(rows) => rows.into_iter().next(),
            QueryOutput::Done { .. } => None,
        }
    }

    pub fn into_rows(self) -> Vec<AnyRow> {
        match self {
            QueryOutput::Rows(rows) => rows,
            QueryOutput::Row(row) => row.into_iter().collect(),
            QueryOutput::Done { .. } => Vec::new(),
        }
    }
}

/// Rewrites `?` placeholders into the dialect's own syntax.
///
/// Postgres wants `$1..$n`; a `?` inside a single-quoted literal is not a
/// placeholder and is kept as is.
pub fn translate_placeholders(sql: &str, backend: Backend) -> Cow<'_, str> {
    if backend == Backend::Sqlite || !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut n = 0;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

const SQLITE_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        email TEXT NOT NULL,
        password TEXT NOT NULL,
        password_scheme TEXT NOT NULL DEFAULT 'plain',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS watchlist (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        movie_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        poster_path TEXT,
        added_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id),
        UNIQUE (user_id, movie_id)
    )
    "#,
];

const POSTGRES_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        email TEXT NOT NULL,
        password TEXT NOT NULL,
        password_scheme TEXT NOT NULL DEFAULT 'plain',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS watchlist (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (id),
        movie_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        poster_path TEXT,
        added_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, movie_id)
    )
    "#,
];

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@devopsflix.com";

/// Relational store for users and watchlists, on SQLite or Postgres.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        sqlx::any::install_default_drivers();

        let url = config
            .url()
            .context("the memory store has no database connection")?;
        let (backend, options) = match config {
            DatabaseConfig::Postgres { .. } => {
                (Backend::Postgres, AnyPoolOptions::new().max_connections(10))
            }
            DatabaseConfig::Sqlite { path } if path == ":memory:" => (
                Backend::Sqlite,
                // each in-memory connection is its own database
                AnyPoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None),
            ),
            _ => (Backend::Sqlite, AnyPoolOptions::new().max_connections(5)),
        };

        let pool = options
            .connect(&url)
            .await
            .with_context(|| format!("connect to {} database", backend.name()))?;
        info!(backend = backend.name(), "database connected");
        Ok(Self { pool, backend })
    }

    /// Fresh private SQLite database, for tests.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let db = Self::connect(&DatabaseConfig::Sqlite {
            path: ":memory:".into(),
        })
        .await?;
        Ok(db)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Single entry point for every statement the service runs.
    pub async fn execute_query(
        &self,
        sql: &str,
        params: Vec<SqlParam>,
        fetch: Fetch,
    ) -> sqlx::Result<QueryOutput> {
        let sql = translate_placeholders(sql, self.backend);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = match param {
                SqlParam::Int(v) => query.bind(v),
                SqlParam::Text(v) => query.bind(v),
                SqlParam::OptText(v) => query.bind(v),
            };
        }

        let out = match fetch {
            Fetch::None => {
                let res = query.execute(&self.pool).await?;
                QueryOutput::Done {
                    rows_affected: res.rows_affected(),
                }
            }
            Fetch::One => QueryOutput::Row(query.fetch_optional(&self.pool).await?),
            Fetch::All => QueryOutput::Rows(query.fetch_all(&self.pool).await?),
        };
        Ok(out)
    }

    /// Creates missing tables and seeds the default account. Safe to rerun.
    pub async fn init_schema(&self, admin_password: &str) -> anyhow::Result<()> {
        let ddl = match self.backend {
            Backend::Sqlite => SQLITE_SCHEMA,
            Backend::Postgres => POSTGRES_SCHEMA,
        };
        for stmt in ddl {
            self.execute_query(stmt, vec![], Fetch::None)
                .await
                .context("create table")?;
        }
        self.ensure_password_scheme_column().await?;

        let existing = self
            .execute_query(
                "SELECT id FROM users WHERE username = ?",
                vec![DEFAULT_ADMIN_USERNAME.into()],
                Fetch::One,
            )
            .await?
            .into_row();
        if existing.is_none() {
            let password = StoredPassword::Hashed(hash_password(admin_password)?);
            self.execute_query(
                "INSERT INTO users (username, email, password, password_scheme) VALUES (?, ?, ?, ?)",
                vec![
                    DEFAULT_ADMIN_USERNAME.into(),
                    DEFAULT_ADMIN_EMAIL.into(),
                    password.value().into(),
                    password.scheme().into(),
                ],
                Fetch::None,
            )
            .await
            .context("seed default user")?;
            info!(username = DEFAULT_ADMIN_USERNAME, "default user created");
        }

        debug!(backend = self.backend.name(), "schema ready");
        Ok(())
    }

    /// A `users` table written before schemes existed lacks the column;
    /// its rows are all plain text.
    async fn ensure_password_scheme_column(&self) -> anyhow::Result<()> {
        let lookup = match self.backend {
            Backend::Sqlite => "SELECT name FROM pragma_table_info('users') WHERE name = ?",
            Backend::Postgres => {
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = 'users' AND column_name = ?"
            }
        };
        let present = self
            .execute_query(lookup, vec!["password_scheme".into()], Fetch::One)
            .await
            .context("inspect users columns")?
            .into_row()
            .is_some();
        if present {
            return Ok(());
        }

        self.execute_query(
            "ALTER TABLE users ADD COLUMN password_scheme TEXT NOT NULL DEFAULT 'plain'",
            vec![],
            Fetch::None,
        )
        .await
        .context("add password_scheme column")?;
        warn!("legacy users table upgraded; existing passwords marked plain");
        Ok(())
    }

    pub async fn ping(&self) -> sqlx::Result<()> {
        self.execute_query("SELECT 1 AS ok", vec![], Fetch::One)
            .await?
            .into_row()
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(())
    }
}

/// Liveness check for whichever store backs the service.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl StoreHealth for Database {
    fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Database::ping(self).await.context("database ping")
    }
}

/// True when the error is a unique-constraint violation on either backend.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
