//! User module: three-layer architecture (domain, repository, service).
//!
//! The service talks to storage only through the `UserRepository` port; the
//! in-memory and Postgres adapters live under `repo`.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::UserService;
