use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::database::repository::{Entity, SqliteQuery};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TodoItem {
    pub id: i64,
    pub user_id: i64,
    pub item_description: String,
    pub is_completed: bool,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub version: i64,
}

impl Entity for TodoItem {
    const TABLE: &'static str = "todo_items";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "item_description",
        "is_completed",
        "created_date",
        "modified_date",
    ];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.user_id)
            .bind(&self.item_description)
            .bind(self.is_completed)
            .bind(self.created_date)
            .bind(self.modified_date)
    }
}
