pub mod collection;
pub mod item;

// Re-export handler functions for use in routing
pub use collection::get as collection_get;
pub use collection::post as collection_post;

pub use item::delete as item_delete;
pub use item::get as item_get;
pub use item::put as item_put;
