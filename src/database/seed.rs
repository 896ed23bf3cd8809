use chrono::Utc;
use tracing::info;

use crate::auth::hash_password;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{TodoItem, User};

pub const SAMPLE_PASSWORD: &str = "Test@123";

const SAMPLE_USERS: &[(&str, &[&str])] = &[
    ("Sample", &["Design system", "Implement system"]),
    ("Sampletest", &["purchase", "Design system"]),
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] crate::auth::PasswordError),
}

/// Insert the demo users and their items, unless any user already exists.
/// Returns whether anything was written.
pub async fn seed_sample_data(db: &DatabaseManager) -> Result<bool, SeedError> {
    let mut uow = db.unit_of_work().await?;
    if uow.users().count().await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(SAMPLE_PASSWORD)?;
    let now = Utc::now();

    for (user_name, descriptions) in SAMPLE_USERS {
        let user_id = uow
            .users()
            .add(&User {
                id: 0,
                user_name: user_name.to_string(),
                email_id: String::new(),
                password_hash: password_hash.clone(),
                version: 1,
            })
            .await?;

        for description in descriptions.iter() {
            uow.todo_items()
                .add(&TodoItem {
                    id: 0,
                    user_id,
                    item_description: description.to_string(),
                    is_completed: false,
                    created_date: now,
                    modified_date: now,
                    version: 1,
                })
                .await?;
        }
    }

    let changed = uow.save().await?;
    info!("Seeded {} sample users", SAMPLE_USERS.len());
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn seeds_once() {
        let db = DatabaseManager::connect(&AppConfig::development().database)
            .await
            .unwrap();

        assert!(seed_sample_data(&db).await.unwrap());
        assert!(!seed_sample_data(&db).await.unwrap());

        let mut uow = db.unit_of_work().await.unwrap();
        assert_eq!(uow.users().count().await.unwrap(), 2);
        assert_eq!(uow.todo_items().count().await.unwrap(), 4);

        let sample = uow.users().find_by_name("Sample").await.unwrap().unwrap();
        assert!(verify_password(SAMPLE_PASSWORD, &sample.password_hash).unwrap());
        let items = uow.todo_items().list_for_user(sample.id).await.unwrap();
        let descriptions: Vec<_> = items.iter().map(|i| i.item_description.as_str()).collect();
        assert_eq!(descriptions, vec!["Design system", "Implement system"]);
    }
}
