//! Database entities for the Postgres-backed user repository.

pub mod db;
pub mod user;
