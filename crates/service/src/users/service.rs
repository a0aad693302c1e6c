use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{NewUser, User};
use super::repository::UserRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// User use cases, independent of web framework and storage backend.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

/// Parse a client-supplied id; empty or malformed ids are a field error.
pub fn parse_user_id(id: &str) -> Result<Uuid, ServiceError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ServiceError::invalid("id", "user id is required"));
    }
    Uuid::parse_str(id).map_err(|_| ServiceError::invalid("id", "user id must be a UUID"))
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self { Self { repo } }

    /// Register a new user.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::users::{UserService, repo::MemoryUserRepository};
    /// let svc = UserService::new(Arc::new(MemoryUserRepository::new()));
    /// let user = tokio_test::block_on(svc.create_user("user@example.com", "Test")).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert!(tokio_test::block_on(svc.create_user("user@example.com", "Again")).is_err());
    /// ```
    #[instrument(skip(self), fields(email = %email))]
    pub async fn create_user(&self, email: &str, name: &str) -> Result<User, ServiceError> {
        let input = NewUser::new(email, name)?;
        match self.repo.get_by_email(&input.email).await {
            Ok(existing) => {
                debug!(user_id = %existing.id, "email already registered");
                return Err(ServiceError::already_exists("user"));
            }
            Err(ServiceError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        let user = self.repo.create(input).await?;
        info!(user_id = %user.id, "user_created");
        Ok(user)
    }

    /// Register several users atomically.
    #[instrument(skip(self, users), fields(count = users.len()))]
    pub async fn create_users(&self, users: Vec<(String, String)>) -> Result<Vec<User>, ServiceError> {
        let inputs = users
            .into_iter()
            .map(|(email, name)| NewUser::new(email, name))
            .collect::<Result<Vec<_>, _>>()?;
        let created = self.repo.create_batch(inputs).await?;
        info!(count = created.len(), "users_created");
        Ok(created)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        let id = parse_user_id(id)?;
        self.repo.get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.repo.get_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        self.repo.list().await
    }

    /// One page of users plus the total count, for computing page numbers.
    pub async fn list_users_paginated(&self, page: Pagination) -> Result<(Vec<User>, u64), ServiceError> {
        self.repo.list_page(page).await
    }

    pub async fn search_users(&self, keyword: &str) -> Result<Vec<User>, ServiceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.repo.list().await;
        }
        self.repo.search(keyword).await
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: &str, name: &str) -> Result<User, ServiceError> {
        let id = parse_user_id(id)?;
        let user = self.repo.update_name(id, name).await?;
        info!(user_id = %user.id, "user_updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_user_id(id)?;
        self.repo.delete(id).await?;
        info!(user_id = %id, "user_deleted");
        Ok(())
    }
}
