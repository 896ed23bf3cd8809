use async_trait::async_trait;
use tracing::{debug, info};

use crate::auth::{hash_password, verify_password};
use crate::database::models as entities;
use crate::database::{DatabaseError, DatabaseManager};
use crate::services::error::ServiceError;
use crate::services::models::{Registration, User};
use crate::services::validation;

#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Validate and store a new user with a hashed password.
    async fn add_user(&self, registration: Registration) -> Result<User, ServiceError>;

    async fn get_user_details(&self, user_name: &str) -> Result<Option<User>, ServiceError>;

    async fn check_user(&self, id: i64) -> Result<bool, ServiceError>;

    /// The user whose name and password both match, if any.
    async fn authenticate(&self, user_name: &str, password: &str) -> Result<Option<User>, ServiceError>;
}

pub struct SqlUserProvider {
    db: DatabaseManager,
}

impl SqlUserProvider {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserProvider for SqlUserProvider {
    async fn add_user(&self, registration: Registration) -> Result<User, ServiceError> {
        validation::validate_registration(&registration)?;

        if self.get_user_details(&registration.user_name).await?.is_some() {
            return Err(ServiceError::UserAlreadyExists(registration.user_name));
        }

        let Registration {
            user_name,
            email_id,
            password,
        } = registration;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let mut entity = entities::User {
            id: 0,
            user_name,
            email_id,
            password_hash,
            version: 1,
        };

        let mut uow = self.db.unit_of_work().await?;
        let added = uow.users().add(&entity).await;
        entity.id = match added {
            Ok(id) => id,
            // Lost a race with a concurrent registration of the same name
            Err(DatabaseError::UniqueViolation(_)) => {
                return Err(ServiceError::UserAlreadyExists(entity.user_name));
            }
            Err(e) => return Err(e.into()),
        };
        uow.save().await?;

        info!("Registered user '{}' (id {})", entity.user_name, entity.id);
        Ok(User::from(entity))
    }

    async fn get_user_details(&self, user_name: &str) -> Result<Option<User>, ServiceError> {
        let mut uow = self.db.unit_of_work().await?;
        let user = uow.users().find_by_name(user_name).await?;
        Ok(user.map(User::from))
    }

    async fn check_user(&self, id: i64) -> Result<bool, ServiceError> {
        let mut uow = self.db.unit_of_work().await?;
        let exists = uow.users().exists(id).await?;
        Ok(exists)
    }

    async fn authenticate(&self, user_name: &str, password: &str) -> Result<Option<User>, ServiceError> {
        // Release the connection before the slow hash comparison
        let mut uow = self.db.unit_of_work().await?;
        let user = uow.users().find_by_name(user_name).await?;
        drop(uow);

        let Some(user) = user else {
            debug!("Authentication failed: no user named '{}'", user_name);
            return Ok(None);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;

        Ok(matches.then(|| User::from(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    async fn provider() -> SqlUserProvider {
        let db = DatabaseManager::connect(&AppConfig::development().database)
            .await
            .unwrap();
        SqlUserProvider::new(db)
    }

    fn registration(name: &str) -> Registration {
        Registration {
            user_name: name.to_string(),
            email_id: format!("{name}@example.com"),
            password: "Test@123".to_string(),
        }
    }

    #[tokio::test]
    async fn registers_and_authenticates() {
        let users = provider().await;
        let created = users.add_user(registration("alice")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.email_id, "alice@example.com");

        let found = users.get_user_details("alice").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(users.check_user(created.id).await.unwrap());
        assert!(!users.check_user(created.id + 1).await.unwrap());

        assert_eq!(users.authenticate("alice", "Test@123").await.unwrap(), Some(created));
        assert_eq!(users.authenticate("alice", "Wrong@123").await.unwrap(), None);
        assert_eq!(users.authenticate("nobody", "Test@123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_duplicate_user_name() {
        let users = provider().await;
        users.add_user(registration("bob")).await.unwrap();

        let err = users.add_user(registration("bob")).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserAlreadyExists(name) if name == "bob"));
    }

    #[tokio::test]
    async fn rejects_weak_password_before_touching_the_store() {
        let users = provider().await;
        let mut weak = registration("carol");
        weak.password = "password".to_string();

        let err = users.add_user(weak).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "password", .. }));
        assert!(users.get_user_details("carol").await.unwrap().is_none());
    }
}
