use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::unit_of_work::UnitOfWork;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Row {id} in '{table}' was changed or removed since it was read")]
    ConcurrencyConflict { table: &'static str, id: i64 },

    #[error("Duplicate value violates a unique constraint on '{0}'")]
    UniqueViolation(&'static str),

    #[error("Row in '{0}' refers to a missing parent row")]
    ForeignKeyViolation(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map driver errors for writes against `table`, surfacing constraint violations.
    pub(crate) fn from_write(table: &'static str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::UniqueViolation(table)
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DatabaseError::ForeignKeyViolation(table)
            }
            _ => DatabaseError::Sqlx(err),
        }
    }

    /// SQLite gave up waiting for a lock (`SQLITE_BUSY` / `SQLITE_LOCKED` and
    /// their extended codes).
    pub fn is_busy(&self) -> bool {
        let DatabaseError::Sqlx(sqlx::Error::Database(db_err)) = self else {
            return false;
        };
        db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6))
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_name     TEXT    NOT NULL UNIQUE,
        email_id      TEXT    NOT NULL DEFAULT '',
        password_hash TEXT    NOT NULL,
        version       INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS todo_items (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id          INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        item_description TEXT    NOT NULL DEFAULT '',
        is_completed     BOOLEAN NOT NULL DEFAULT 0,
        created_date     TEXT    NOT NULL,
        modified_date    TEXT    NOT NULL,
        version          INTEGER NOT NULL DEFAULT 1
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_todo_items_user_id ON todo_items (user_id)",
];

/// Owns the connection pool and hands out units of work.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open the pool described by `config` and make sure the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let in_memory = Self::is_in_memory(&config.url);
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.url.clone()))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.connection_timeout));

        // Readers must not block the writer that commits the next row version.
        let options = if in_memory {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connection_timeout));

        // An in-memory database lives exactly as long as its connection, so
        // keep a single one open for the lifetime of the pool.
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        let manager = Self { pool };
        manager.bootstrap().await?;

        info!("Created database pool for: {}", config.url);
        Ok(manager)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they are missing. Safe to run repeatedly.
    pub async fn bootstrap(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Begin a transaction-scoped unit of work.
    pub async fn unit_of_work(&self) -> Result<UnitOfWork, DatabaseError> {
        UnitOfWork::begin(&self.pool).await
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn detects_in_memory_urls() {
        assert!(DatabaseManager::is_in_memory("sqlite::memory:"));
        assert!(DatabaseManager::is_in_memory("sqlite://todo?mode=memory&cache=shared"));
        assert!(!DatabaseManager::is_in_memory("sqlite://todo.db?mode=rwc"));
    }

    #[tokio::test]
    async fn connect_bootstraps_schema_idempotently() {
        let manager = DatabaseManager::connect(&AppConfig::development().database)
            .await
            .unwrap();
        manager.bootstrap().await.unwrap();
        manager.health_check().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(manager.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["todo_items".to_string(), "users".to_string()]);
    }

    #[tokio::test]
    async fn fails_on_unopenable_database() {
        let mut config = AppConfig::development().database;
        config.url = "sqlite://missing-dir/does-not-exist.db".to_string();
        assert!(DatabaseManager::connect(&config).await.is_err());
    }
}
