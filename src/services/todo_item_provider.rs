use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::database::models as entities;
use crate::database::{DatabaseError, DatabaseManager};
use crate::services::error::ServiceError;
use crate::services::models::TodoItem;

/// To-do item operations, always scoped to the calling user. Items owned by
/// someone else are indistinguishable from items that do not exist.
#[async_trait]
pub trait TodoItemProvider: Send + Sync {
    async fn get_todo_items(&self, user_id: i64) -> Result<Vec<TodoItem>, ServiceError>;

    async fn get_todo_item(&self, user_id: i64, id: i64) -> Result<Option<TodoItem>, ServiceError>;

    async fn add_todo_item(&self, user_id: i64, item: TodoItem) -> Result<TodoItem, ServiceError>;

    /// Replace description and completion of `item.id`. When `item.version`
    /// is set the write only succeeds against that exact row version.
    async fn update_todo_item(&self, user_id: i64, item: TodoItem) -> Result<TodoItem, ServiceError>;

    async fn remove_todo_item(&self, user_id: i64, id: i64) -> Result<(), ServiceError>;

    async fn check_item(&self, id: i64) -> Result<bool, ServiceError>;
}

pub struct SqlTodoItemProvider {
    db: DatabaseManager,
}

impl SqlTodoItemProvider {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// A write matched no row: the caller's item is either gone or was
    /// changed by someone else since it was read.
    async fn resolve_conflict(&self, user_id: i64, id: i64) -> ServiceError {
        match self.get_todo_item(user_id, id).await {
            Ok(None) => ServiceError::ItemNotFound(id),
            Ok(Some(_)) => {
                warn!("Concurrent modification of to-do item {}", id);
                ServiceError::Conflict(id)
            }
            Err(e) => e,
        }
    }
}

#[async_trait]
impl TodoItemProvider for SqlTodoItemProvider {
    async fn get_todo_items(&self, user_id: i64) -> Result<Vec<TodoItem>, ServiceError> {
        let mut uow = self.db.unit_of_work().await?;
        let items = uow.todo_items().list_for_user(user_id).await?;
        Ok(items.into_iter().map(TodoItem::from).collect())
    }

    async fn get_todo_item(&self, user_id: i64, id: i64) -> Result<Option<TodoItem>, ServiceError> {
        let mut uow = self.db.unit_of_work().await?;
        let item = uow.todo_items().find_for_user(user_id, id).await?;
        Ok(item.map(TodoItem::from))
    }

    async fn add_todo_item(&self, user_id: i64, item: TodoItem) -> Result<TodoItem, ServiceError> {
        let now = Utc::now();
        let mut entity = entities::TodoItem {
            id: 0,
            user_id,
            item_description: item.item_description,
            is_completed: item.is_completed,
            created_date: now,
            modified_date: now,
            version: 1,
        };

        let mut uow = self.db.unit_of_work().await?;
        let added = uow.todo_items().add(&entity).await;
        entity.id = match added {
            Ok(id) => id,
            Err(DatabaseError::ForeignKeyViolation(_)) => return Err(ServiceError::UserNotFound(user_id)),
            Err(e) => return Err(e.into()),
        };
        uow.save().await?;

        debug!("Created to-do item {} for user {}", entity.id, user_id);
        Ok(TodoItem::from(entity))
    }

    async fn update_todo_item(&self, user_id: i64, item: TodoItem) -> Result<TodoItem, ServiceError> {
        let now = Utc::now();
        let changes = entities::TodoItem {
            id: item.id,
            user_id,
            item_description: item.item_description,
            is_completed: item.is_completed,
            created_date: now,
            modified_date: now,
            version: item.version.unwrap_or_default(),
        };

        // Write before reading so the unit of work never holds a read lock it
        // would have to upgrade.
        let mut uow = self.db.unit_of_work().await?;
        let updated = uow.todo_items().update_for_user(&changes, item.version).await;
        match updated {
            Ok(()) => {}
            Err(DatabaseError::ConcurrencyConflict { .. }) => {
                drop(uow);
                return Err(self.resolve_conflict(user_id, item.id).await);
            }
            Err(e) => return Err(e.into()),
        }

        let stored = uow.todo_items().find(item.id).await?;
        uow.save().await?;

        stored
            .map(TodoItem::from)
            .ok_or(ServiceError::ItemNotFound(item.id))
    }

    async fn remove_todo_item(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        let mut uow = self.db.unit_of_work().await?;
        let removed = uow.todo_items().remove_for_user(user_id, id).await;
        match removed {
            Ok(()) => {}
            Err(DatabaseError::ConcurrencyConflict { .. }) => return Err(ServiceError::ItemNotFound(id)),
            Err(e) => return Err(e.into()),
        }
        uow.save().await?;

        debug!("Removed to-do item {} for user {}", id, user_id);
        Ok(())
    }

    async fn check_item(&self, id: i64) -> Result<bool, ServiceError> {
        let mut uow = self.db.unit_of_work().await?;
        let exists = uow.todo_items().exists(id).await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::database::seed::seed_sample_data;

    /// Seeded store: user 1 owns items 1-2, user 2 owns items 3-4.
    async fn provider() -> SqlTodoItemProvider {
        let db = DatabaseManager::connect(&AppConfig::development().database)
            .await
            .unwrap();
        seed_sample_data(&db).await.unwrap();
        SqlTodoItemProvider::new(db)
    }

    fn draft(description: &str) -> TodoItem {
        TodoItem {
            item_description: description.to_string(),
            ..TodoItem::default()
        }
    }

    #[tokio::test]
    async fn lists_only_the_callers_items() {
        let items = provider().await;
        let mine = items.get_todo_items(1).await.unwrap();
        assert_eq!(mine.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(mine.iter().all(|i| i.user_id == 1));

        assert!(items.get_todo_item(1, 3).await.unwrap().is_none());
        assert!(items.get_todo_item(2, 3).await.unwrap().is_some());
        assert!(items.get_todo_items(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_sets_owner_and_timestamps() {
        let items = provider().await;
        let mut input = draft("Write tests");
        input.user_id = 2;
        input.id = 77;

        let created = items.add_todo_item(1, input).await.unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.user_id, 1);
        assert_eq!(created.created_date, created.modified_date);
        assert_eq!(created.version, Some(1));
        assert_eq!(items.get_todo_item(1, 5).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn add_for_unknown_user_fails() {
        let items = provider().await;
        let err = items.add_todo_item(42, draft("orphan")).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(42)));
    }

    #[tokio::test]
    async fn update_preserves_created_date_and_bumps_version() {
        let items = provider().await;
        let original = items.get_todo_item(1, 1).await.unwrap().unwrap();

        let mut change = original.clone();
        change.is_completed = true;
        change.created_date = Utc::now() + chrono::Duration::days(1);
        let updated = items.update_todo_item(1, change).await.unwrap();

        assert!(updated.is_completed);
        assert_eq!(updated.created_date, original.created_date);
        assert!(updated.modified_date >= original.modified_date);
        assert_eq!(updated.version, Some(2));
        assert_eq!(items.get_todo_item(1, 1).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let items = provider().await;
        let read = items.get_todo_item(1, 2).await.unwrap().unwrap();

        let mut first = read.clone();
        first.item_description = "first writer".to_string();
        items.update_todo_item(1, first).await.unwrap();

        let mut second = read;
        second.item_description = "second writer".to_string();
        let err = items.update_todo_item(1, second).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(2)));

        let stored = items.get_todo_item(1, 2).await.unwrap().unwrap();
        assert_eq!(stored.item_description, "first writer");
    }

    #[tokio::test]
    async fn update_without_version_is_last_write_wins() {
        let items = provider().await;
        let mut change = draft("no version");
        change.id = 1;
        let updated = items.update_todo_item(1, change).await.unwrap();
        assert_eq!(updated.item_description, "no version");
    }

    #[tokio::test]
    async fn foreign_or_missing_items_are_not_found() {
        let items = provider().await;

        let mut foreign = draft("hijack");
        foreign.id = 3;
        assert!(matches!(
            items.update_todo_item(1, foreign).await.unwrap_err(),
            ServiceError::ItemNotFound(3)
        ));
        assert!(matches!(
            items.remove_todo_item(1, 3).await.unwrap_err(),
            ServiceError::ItemNotFound(3)
        ));
        assert!(matches!(
            items.remove_todo_item(1, 999).await.unwrap_err(),
            ServiceError::ItemNotFound(999)
        ));
        assert!(items.check_item(3).await.unwrap());
    }

    #[tokio::test]
    async fn remove_deletes_item() {
        let items = provider().await;
        items.remove_todo_item(2, 4).await.unwrap();
        assert!(!items.check_item(4).await.unwrap());
        assert_eq!(items.get_todo_items(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn conflict_resolves_by_caller_visible_existence() {
        let items = provider().await;
        assert!(matches!(items.resolve_conflict(1, 999).await, ServiceError::ItemNotFound(999)));
        assert!(matches!(items.resolve_conflict(1, 3).await, ServiceError::ItemNotFound(3)));
        assert!(matches!(items.resolve_conflict(1, 1).await, ServiceError::Conflict(1)));
    }

    fn scratch_database_url(name: &str) -> (String, PathBuf) {
        let path = std::env::temp_dir().join(format!("todo-{}-{}.db", name, std::process::id()));
        remove_database_files(&path);
        (format!("sqlite://{}?mode=rwc", path.display()), path)
    }

    fn remove_database_files(path: &Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_a_file_database_get_one_success_and_conflicts() {
        let (url, path) = scratch_database_url("concurrent-writers");
        let mut config = AppConfig::development().database;
        config.url = url;
        config.max_connections = 8;

        let db = DatabaseManager::connect(&config).await.unwrap();
        seed_sample_data(&db).await.unwrap();
        let items = Arc::new(SqlTodoItemProvider::new(db.clone()));
        let read = items.get_todo_item(1, 1).await.unwrap().unwrap();
        assert_eq!(read.version, Some(1));

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let items = Arc::clone(&items);
                let mut change = read.clone();
                change.item_description = format!("writer {n}");
                tokio::spawn(async move { items.update_todo_item(1, change).await })
            })
            .collect();

        let (mut succeeded, mut conflicted) = (0, 0);
        for writer in writers {
            match writer.await.unwrap() {
                Ok(updated) => {
                    assert_eq!(updated.version, Some(2));
                    succeeded += 1;
                }
                Err(ServiceError::Conflict(1)) => conflicted += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!((succeeded, conflicted), (1, 7));

        let stored = items.get_todo_item(1, 1).await.unwrap().unwrap();
        assert_eq!(stored.version, Some(2));

        db.close().await;
        remove_database_files(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_last_write_wins_updates_all_succeed_on_a_file_database() {
        let (url, path) = scratch_database_url("last-write-wins");
        let mut config = AppConfig::development().database;
        config.url = url;

        let db = DatabaseManager::connect(&config).await.unwrap();
        seed_sample_data(&db).await.unwrap();
        let items = Arc::new(SqlTodoItemProvider::new(db.clone()));

        let writers: Vec<_> = (0..6)
            .map(|n| {
                let items = Arc::clone(&items);
                let change = TodoItem {
                    id: 3,
                    item_description: format!("writer {n}"),
                    ..TodoItem::default()
                };
                tokio::spawn(async move { items.update_todo_item(2, change).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let stored = items.get_todo_item(2, 3).await.unwrap().unwrap();
        assert_eq!(stored.version, Some(7));

        db.close().await;
        remove_database_files(&path);
    }
}
