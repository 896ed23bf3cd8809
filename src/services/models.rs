use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models as entities;

/// To-do item as exchanged with clients.
///
/// `userId`, `createdDate` and `modifiedDate` are owned by the server: any
/// values a client sends are overwritten. `version` is the row version last
/// read; sending it back on update enables the optimistic concurrency check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoItem {
    pub id: i64,
    pub user_id: i64,
    pub item_description: String,
    pub is_completed: bool,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl From<entities::TodoItem> for TodoItem {
    fn from(entity: entities::TodoItem) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            item_description: entity.item_description,
            is_completed: entity.is_completed,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            version: Some(entity.version),
        }
    }
}

/// Public view of a user. The password hash never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email_id: String,
}

impl From<entities::User> for User {
    fn from(entity: entities::User) -> Self {
        Self {
            id: entity.id,
            user_name: entity.user_name,
            email_id: entity.email_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub password: String,
}
