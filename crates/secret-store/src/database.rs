//! SQLite implementation of the secret store contract.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Row,
};
use url::Url;

use common::store::{SecretStore, StoreError};

use crate::error::{Result, SqliteStoreError};

const MEMORY_PATH: &str = ":memory:";

/// SQLite connection pool holding the `secrets` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub async fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory database.
    ///
    /// Limited to one connection, since every connection to
    ///  `:memory:` would otherwise get its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(MEMORY_PATH);

        // the database lives and dies with its one connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Connect from a `sqlite://<path>` or `sqlite::memory:` URL.
    pub async fn connect(database_url: &Url) -> Result<Self> {
        if database_url.scheme() != "sqlite" {
            return Err(SqliteStoreError::UnknownDbType(
                database_url.scheme().to_string(),
            ));
        }

        if database_url.path() == MEMORY_PATH {
            return Self::in_memory().await;
        }

        // sqlite://relative.db parses the file name as the host
        let encoded = format!(
            "{}{}",
            database_url.host_str().unwrap_or_default(),
            database_url.path()
        );
        let path = urlencoding::decode(&encoded)
            .map_err(|e| SqliteStoreError::InvalidPath(format!("{}: {}", encoded, e)))?;
        tracing::debug!(path = %path, "opening sqlite secret store");
        Self::new(Path::new(path.as_ref())).await
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Number of live (unexpired) entries.
    pub async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM secrets WHERE expires_at > ?")
            .bind(now_millis())
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.get("count");
        Ok(count.max(0) as u64)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn expiry_millis(ttl: Duration) -> i64 {
    let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_millis().saturating_add(ttl)
}

#[async_trait]
impl SecretStore for SqliteStore {
    type Error = SqliteStoreError;

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> std::result::Result<(), StoreError<Self::Error>> {
        sqlx::query(
            r#"
            INSERT INTO secrets (key, value, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expiry_millis(ttl))
        .bind(now_millis())
        .execute(&self.pool)
        .await
        .map_err(SqliteStoreError::from)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, StoreError<Self::Error>> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM secrets
            WHERE key = ? AND expires_at > ?
            "#,
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(SqliteStoreError::from)?;

        row.map(|r| r.get::<Vec<u8>, _>("value"))
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), StoreError<Self::Error>> {
        sqlx::query("DELETE FROM secrets WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(SqliteStoreError::from)?;
        Ok(())
    }

    async fn take(&self, key: &str) -> std::result::Result<Vec<u8>, StoreError<Self::Error>> {
        // a single statement, so concurrent takers cannot both see the row
        let row = sqlx::query(
            r#"
            DELETE FROM secrets
            WHERE key = ? AND expires_at > ?
            RETURNING value
            "#,
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(SqliteStoreError::from)?;

        row.map(|r| r.get::<Vec<u8>, _>("value"))
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn purge_expired(&self) -> std::result::Result<u64, StoreError<Self::Error>> {
        let result = sqlx::query("DELETE FROM secrets WHERE expires_at <= ?")
            .bind(now_millis())
            .execute(&self.pool)
            .await
            .map_err(SqliteStoreError::from)?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> std::result::Result<(), StoreError<Self::Error>> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(SqliteStoreError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[tokio::test]
    async fn test_in_memory_set_get_take() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.set("k", b"v".to_vec(), HOUR).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"v");
        assert_eq!(store.count().await.unwrap(), 1);

        assert_eq!(store.take("k").await.unwrap(), b"v");
        assert!(store.take("k").await.unwrap_err().is_not_found());
        assert!(store.get("k").await.unwrap_err().is_not_found());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_memory_url() {
        let url = Url::parse("sqlite::memory:").unwrap();
        let store = SqliteStore::connect(&url).await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_rejects_other_schemes() {
        let url = Url::parse("postgres://localhost/db").unwrap();
        let err = SqliteStore::connect(&url).await.unwrap_err();
        assert!(matches!(err, SqliteStoreError::UnknownDbType(s) if s == "postgres"));
    }

    #[test]
    fn test_expiry_saturates() {
        assert_eq!(expiry_millis(Duration::MAX), i64::MAX);
    }
}
