use crate::database::manager::DatabaseError;
use crate::database::models::TodoItem;
use crate::database::repository::Repository;

pub type TodoItemRepository<'c> = Repository<'c, TodoItem>;

impl Repository<'_, TodoItem> {
    pub async fn list_for_user(&mut self, user_id: i64) -> Result<Vec<TodoItem>, DatabaseError> {
        let items = sqlx::query_as::<_, TodoItem>(
            "SELECT * FROM todo_items WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.connection())
        .await?;
        Ok(items)
    }

    /// Look up an item only if it belongs to `user_id`.
    pub async fn find_for_user(&mut self, user_id: i64, id: i64) -> Result<Option<TodoItem>, DatabaseError> {
        let item = sqlx::query_as::<_, TodoItem>(
            "SELECT * FROM todo_items WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.connection())
        .await?;
        Ok(item)
    }

    /// Overwrite description, completion and modification time of the row
    /// `item.id` owned by `item.user_id`, bumping its version. `created_date`
    /// and `version` on `item` are ignored.
    ///
    /// With `expected_version` the write only applies if the stored version
    /// still matches. The ownership and version checks happen inside this one
    /// statement, so when it is the first statement of a unit of work the
    /// write lock is requested before anything has been read.
    pub async fn update_for_user(
        &mut self,
        item: &TodoItem,
        expected_version: Option<i64>,
    ) -> Result<(), DatabaseError> {
        let mut sql = String::from(
            "UPDATE todo_items \
             SET item_description = ?, is_completed = ?, modified_date = ?, version = version + 1 \
             WHERE id = ? AND user_id = ?",
        );
        if expected_version.is_some() {
            sql.push_str(" AND version = ?");
        }

        let mut query = sqlx::query(&sql)
            .bind(&item.item_description)
            .bind(item.is_completed)
            .bind(item.modified_date)
            .bind(item.id)
            .bind(item.user_id);
        if let Some(version) = expected_version {
            query = query.bind(version);
        }

        self.write_row(item.id, query).await
    }

    /// Delete the item only if it belongs to `user_id`.
    pub async fn remove_for_user(&mut self, user_id: i64, id: i64) -> Result<(), DatabaseError> {
        let query = sqlx::query("DELETE FROM todo_items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id);
        self.write_row(id, query).await
    }
}
