//! In-memory user repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// normalized email -> user ID
    email_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.table.read().await.users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.users.contains_key(user.id()) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if table.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                user.email()
            )));
        }

        table.email_index.insert(user.email().to_string(), *user.id());
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let old_email = match table.users.get(user.id()) {
            Some(existing) => existing.email().to_string(),
            None => {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    user.id()
                )));
            }
        };

        if old_email != user.email() {
            if table.email_index.contains_key(user.email()) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    user.email()
                )));
            }

            table.email_index.remove(&old_email);
            table.email_index.insert(user.email().to_string(), *user.id());
        }

        table.users.insert(*user.id(), user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(id) {
            Some(user) => {
                table.email_index.remove(user.email());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;

        let mut users: Vec<User> = table.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(users)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.users.len())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        let user = table
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        user.record_login();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(UserId::generate(), email, "someone", "Some", "One", "hash")
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_email() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("Ann@Example.com")).await.unwrap();

        let found = repo.get_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(found.id(), created.id());
        assert!(repo.email_exists("ann@example.com").await.unwrap());
        assert!(!repo.email_exists("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("ann@example.com")).await.unwrap();

        let err = repo.create(user("ANN@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let err = repo.update(&user("ann@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_clears_email_index() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("ann@example.com")).await.unwrap();

        assert!(repo.delete(created.id()).await.unwrap());
        assert!(!repo.delete(created.id()).await.unwrap());
        assert!(repo.get_by_email("ann@example.com").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("ann@example.com")).await.unwrap();
        assert!(created.last_login_at().is_none());

        repo.record_login(created.id()).await.unwrap();

        let fetched = repo.get(created.id()).await.unwrap().unwrap();
        assert!(fetched.last_login_at().is_some());
    }
}
