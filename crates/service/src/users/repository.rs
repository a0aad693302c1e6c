use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewUser, User};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Repository abstraction (port) for user persistence.
///
/// Lookups that find nothing return `ServiceError::NotFound`; a duplicate
/// email on create returns `ServiceError::AlreadyExists`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, input: NewUser) -> Result<User, ServiceError>;
    /// Insert all users or none.
    async fn create_batch(&self, inputs: Vec<NewUser>) -> Result<Vec<User>, ServiceError>;
    async fn get_by_id(&self, id: Uuid) -> Result<User, ServiceError>;
    async fn get_by_email(&self, email: &str) -> Result<User, ServiceError>;
    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, ServiceError>;
    /// One page, oldest first, together with the total number of users.
    async fn list_page(&self, page: Pagination) -> Result<(Vec<User>, u64), ServiceError>;
    /// Case-insensitive substring match on name or email, oldest first.
    async fn search(&self, keyword: &str) -> Result<Vec<User>, ServiceError>;
    async fn update_name(&self, id: Uuid, name: &str) -> Result<User, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
}
