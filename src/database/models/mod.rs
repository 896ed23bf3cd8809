pub mod todo_item;
pub mod user;

pub use todo_item::TodoItem;
pub use user::User;
