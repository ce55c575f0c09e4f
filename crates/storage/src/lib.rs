use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

mod courses;
mod memory;
pub mod sample;
mod session;

pub use courses::{CollectionStatus, CourseStore, UpsertOutcome};
pub use memory::MemoryStorage;
pub use session::SessionStore;

/// String key-value persistence; every call reads or writes one whole value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
    /// Total characters held across keys and values.
    async fn usage_chars(&self) -> Result<usize>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every pooled connection to an in-memory database is a separate database
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read key '{key}'"))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write key '{key}'"))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove key '{key}'"))?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool)
            .await
            .context("failed to clear key-value store")?;
        Ok(())
    }

    async fn usage_chars(&self) -> Result<usize> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(length(key) + length(value)), 0) FROM kv_store")
                .fetch_one(&self.pool)
                .await
                .context("failed to measure key-value store usage")?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Turns a bare file path or a `sqlite:` path into a `sqlite://` URL.
/// In-memory and other `scheme://` URLs pass through; blank input yields
/// `None`.
pub fn normalize_sqlite_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if is_memory_url(raw) || raw.contains("://") {
        return Some(raw.to_string());
    }
    let path = raw.strip_prefix("sqlite:").unwrap_or(raw).replace('\\', "/");
    Some(format!("sqlite://{path}"))
}

/// Creates the directory a file-backed database will live in.
pub fn ensure_sqlite_parent_dir(database_url: &str) -> Result<()> {
    let path = sqlite_path(database_url);
    match path.as_deref().and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "cannot create directory '{}' for database '{database_url}'",
                    parent.display()
                )
            })
        }
        _ => Ok(()),
    }
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) {
        return None;
    }
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    rest.split('?')
        .next()
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
