use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::todo_item_repository::TodoItemRepository;
use crate::database::user_repository::UserRepository;

/// Groups repository operations into one transaction.
///
/// Nothing is visible to other connections until `save()` commits; dropping
/// a unit of work without saving rolls everything back.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    changes: u64,
}

impl UnitOfWork {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, DatabaseError> {
        let tx = pool.begin().await?;
        Ok(Self { tx, changes: 0 })
    }

    pub fn users(&mut self) -> UserRepository<'_> {
        Repository::new(&mut *self.tx, &mut self.changes)
    }

    pub fn todo_items(&mut self) -> TodoItemRepository<'_> {
        Repository::new(&mut *self.tx, &mut self.changes)
    }

    /// Commit, returning whether any rows were written.
    pub async fn save(self) -> Result<bool, DatabaseError> {
        let changed = self.changes > 0;
        self.tx.commit().await?;
        Ok(changed)
    }
}
