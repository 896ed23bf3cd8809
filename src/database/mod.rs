pub mod manager;
pub mod models;
pub mod repository;
pub mod seed;
pub mod todo_item_repository;
pub mod unit_of_work;
pub mod user_repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{Entity, Repository};
pub use todo_item_repository::TodoItemRepository;
pub use unit_of_work::UnitOfWork;
pub use user_repository::UserRepository;
