use std::marker::PhantomData;

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection};
use tracing::warn;

use crate::database::manager::DatabaseError;

pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A persisted row type the generic repository can read and write.
///
/// Every table has an integer `id` primary key and an integer `version`
/// column, starting at 1, used for optimistic concurrency.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin {
    const TABLE: &'static str;

    /// Writable columns, in the order `bind_columns` binds them.
    const COLUMNS: &'static [&'static str];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

/// Generic insert, lookup and single-row writes over one entity table, bound to the
/// connection of an open unit of work.
pub struct Repository<'c, T> {
    conn: &'c mut SqliteConnection,
    changes: &'c mut u64,
    _phantom: PhantomData<T>,
}

impl<'c, T: Entity> Repository<'c, T> {
    pub fn new(conn: &'c mut SqliteConnection, changes: &'c mut u64) -> Self {
        Self {
            conn,
            changes,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut *self.conn
    }

    /// Insert `entity`, ignoring its `id`, and return the new row id.
    pub async fn add(&mut self, entity: &T) -> Result<i64, DatabaseError> {
        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::COLUMNS.join(", "),
            placeholders
        );

        let result = entity
            .bind_columns(sqlx::query(&sql))
            .execute(&mut *self.conn)
            .await
            .map_err(|e| DatabaseError::from_write(T::TABLE, e))?;

        *self.changes += result.rows_affected();
        Ok(result.last_insert_rowid())
    }

    /// Execute a single-row UPDATE or DELETE aimed at row `id`. A statement
    /// that touches no row is reported as `ConcurrencyConflict`; callers decide
    /// whether that means "gone" or "changed underneath us".
    pub(crate) async fn write_row(&mut self, id: i64, query: SqliteQuery<'_>) -> Result<(), DatabaseError> {
        let result = query
            .execute(&mut *self.conn)
            .await
            .map_err(|e| DatabaseError::from_write(T::TABLE, e))?;

        if result.rows_affected() == 0 {
            warn!("Write conflict on {} row {}", T::TABLE, id);
            return Err(DatabaseError::ConcurrencyConflict { table: T::TABLE, id });
        }

        *self.changes += result.rows_affected();
        Ok(())
    }

    pub async fn find(&mut self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row)
    }

    pub async fn exists(&mut self, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?", T::TABLE);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn count(&mut self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *self.conn).await?;
        Ok(count)
    }
}
