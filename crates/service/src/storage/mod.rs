//! Storage abstractions for service layer
//!
//! `ResourceStore` is the process-lifetime, lock-guarded collection every
//! in-memory entity lives in; `ids` holds the identifier strategies an
//! entity type picks from.

pub mod ids;
pub mod resource_store;

pub use ids::{IdStrategy, SequentialIds, UuidIds};
pub use resource_store::{Resource, ResourceStore};
