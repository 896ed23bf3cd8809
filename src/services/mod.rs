pub mod error;
pub mod models;
pub mod todo_item_provider;
pub mod user_provider;
pub mod validation;

pub use error::ServiceError;
pub use models::{Registration, TodoItem, User};
pub use todo_item_provider::{SqlTodoItemProvider, TodoItemProvider};
pub use user_provider::{SqlUserProvider, UserProvider};
