use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::DatabaseError;

/// Failures surfaced by the providers to the handler layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("User {0} does not exist")]
    UserNotFound(i64),

    #[error("To-do item {0} not found")]
    ItemNotFound(i64),

    #[error("To-do item {0} was modified by another request")]
    Conflict(i64),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}
