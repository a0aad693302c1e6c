use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::storage::ResourceStore;
use crate::users::domain::{NewUser, User, UserPatch};
use crate::users::repository::UserRepository;

/// Process-memory repository backed by a [`ResourceStore`].
#[derive(Default)]
pub struct MemoryUserRepository {
    store: ResourceStore<User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.store.len() }

    pub fn is_empty(&self) -> bool { self.store.is_empty() }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, input: NewUser) -> Result<User, ServiceError> {
        self.store.create(input)
    }

    async fn create_batch(&self, inputs: Vec<NewUser>) -> Result<Vec<User>, ServiceError> {
        self.store.create_batch(inputs)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, ServiceError> {
        self.store.get_by_id(&id)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.store.get_by_unique(email)
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.get_all())
    }

    async fn list_page(&self, page: Pagination) -> Result<(Vec<User>, u64), ServiceError> {
        let (offset, limit) = page.window();
        let (users, total) = self.store.page_with_total(offset, limit);
        Ok((users, total as u64))
    }

    async fn search(&self, keyword: &str) -> Result<Vec<User>, ServiceError> {
        let needle = keyword.to_lowercase();
        Ok(self.store.search(|u| {
            u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        }))
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<User, ServiceError> {
        self.store.update(&id, UserPatch { name: name.to_string() })
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str, name: &str) -> NewUser {
        NewUser { email: email.into(), name: name.into() }
    }

    #[tokio::test]
    async fn memory_repository_crud() -> Result<(), anyhow::Error> {
        let repo = MemoryUserRepository::new();
        let u = repo.create(input("kim@example.com", "Kim")).await?;
        assert_eq!(repo.get_by_email("kim@example.com").await?.id, u.id);

        let renamed = repo.update_name(u.id, "Lee").await?;
        assert_eq!(renamed.name, "Lee");

        repo.delete(u.id).await?;
        assert_eq!(repo.get_by_id(u.id).await, Err(ServiceError::not_found("user")));
        assert!(repo.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_is_case_insensitive() -> Result<(), anyhow::Error> {
        let repo = MemoryUserRepository::new();
        repo.create(input("alice@example.com", "Alice Park")).await?;
        repo.create(input("bob@corp.io", "Bob")).await?;
        repo.create(input("carol@example.com", "Carol")).await?;

        let hits = repo.search("PARK").await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alice Park");

        let hits: Vec<String> = repo.search("example").await?.into_iter().map(|u| u.name).collect();
        assert_eq!(hits, ["Alice Park", "Carol"]);
        Ok(())
    }

    #[tokio::test]
    async fn pages_are_insertion_ordered() -> Result<(), anyhow::Error> {
        let repo = MemoryUserRepository::new();
        for i in 0..5 {
            repo.create(input(&format!("u{i}@example.com"), &format!("U{i}"))).await?;
        }
        let (second, total) = repo.list_page(Pagination { page: 2, per_page: 2 }).await?;
        let second: Vec<String> = second.into_iter().map(|u| u.name).collect();
        assert_eq!(second, ["U2", "U3"]);
        assert_eq!(total, 5);
        let (past_end, total) = repo.list_page(Pagination { page: 4, per_page: 2 }).await?;
        assert!(past_end.is_empty());
        assert_eq!(total, 5);
        Ok(())
    }
}
