pub mod devices;
pub mod items;
pub mod users;

pub use items::ItemsHandler;
pub use users::UsersHandler;
