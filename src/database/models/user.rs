use sqlx::FromRow;

use crate::database::repository::{Entity, SqliteQuery};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email_id: String,
    pub password_hash: String,
    pub version: i64,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["user_name", "email_id", "password_hash"];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.user_name)
            .bind(&self.email_id)
            .bind(&self.password_hash)
    }
}
