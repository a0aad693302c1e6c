//! Service layer: domain entities, the in-memory resource store and the
//! user use cases built on top of it.
//! - `storage` holds the generic, lock-guarded `ResourceStore`.
//! - `items` and `users` define the entities it stores.
//! - `users::repo` adapts the user port to memory or Postgres.

pub mod errors;
pub mod items;
pub mod pagination;
pub mod storage;
pub mod users;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
