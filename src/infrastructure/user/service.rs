//! User service: registration, authentication and account lifecycle

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::billing::BillingStore;
use crate::domain::user::{
    normalize_email, validate_email, validate_name, validate_password, validate_username, User,
    UserId, UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Ignored on public registration
    #[serde(default)]
    pub is_staff: bool,
}

/// User service for authentication and management
#[derive(Debug)]
pub struct UserService<R: UserRepository, B: BillingStore, H: PasswordHasher> {
    repository: Arc<R>,
    billing: Arc<B>,
    hasher: Arc<H>,
    initial_balance: i64,
}

impl<R: UserRepository, B: BillingStore, H: PasswordHasher> UserService<R, B, H> {
    pub fn new(repository: Arc<R>, billing: Arc<B>, hasher: Arc<H>, initial_balance: i64) -> Self {
        Self {
            repository,
            billing,
            hasher,
            initial_balance,
        }
    }

    /// Public sign-up: never grants staff
    pub async fn register(&self, mut request: CreateUserRequest) -> Result<User, DomainError> {
        request.is_staff = false;
        self.create(request).await
    }

    /// Create a user and provision their balance
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let email = normalize_email(&request.email);

        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name("first_name", &request.first_name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name("last_name", &request.last_name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = User::new(
            UserId::generate(),
            email,
            request.username.trim(),
            request.first_name.trim(),
            request.last_name.trim(),
            password_hash,
        )
        .with_staff(request.is_staff);

        let user = self.repository.create(user).await?;
        let balance = self.billing.provision(user.id(), self.initial_balance).await?;

        info!(
            user_id = %user.id(),
            is_staff = user.is_staff(),
            balance = balance.amount(),
            "User created"
        );

        Ok(user)
    }

    /// Verify credentials; `None` for unknown email, wrong password or inactive account
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repository.get_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };

        if !user.is_active() || !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        self.repository.record_login(user.id()).await?;

        self.repository.get(user.id()).await
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Delete a user together with their balance and subscriptions
    pub async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        if self.repository.get(id).await?.is_none() {
            return Ok(false);
        }

        let subscriptions = self.billing.delete_for_user(id).await?;
        self.billing.delete_balance(id).await?;
        let deleted = self.repository.delete(id).await?;

        info!(user_id = %id, subscriptions, "User deleted");

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::balance::{BalanceRepository, DEFAULT_BALANCE};
    use crate::domain::course::{Course, CourseId, CourseRepository};
    use crate::domain::subscription::SubscriptionRepository;
    use crate::infrastructure::billing::{BillingService, InMemoryBillingStore};
    use crate::infrastructure::catalog::InMemoryCourseRepository;
    use chrono::NaiveDate;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    type TestService = UserService<InMemoryUserRepository, InMemoryBillingStore, Argon2Hasher>;

    fn create_service() -> (TestService, Arc<InMemoryBillingStore>) {
        let billing = Arc::new(InMemoryBillingStore::new());
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            billing.clone(),
            Arc::new(Argon2Hasher::new()),
            DEFAULT_BALANCE,
        );
        (service, billing)
    }

    fn make_request(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: "student".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            password: password.to_string(),
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn test_register_provisions_balance() {
        let (service, billing) = create_service();

        let user = service
            .register(make_request("ivan@example.com", "secure_password123"))
            .await
            .unwrap();

        assert_eq!(user.full_name(), "Ivan Petrov");
        assert!(!user.is_staff());

        let balance = billing.get_balance(user.id()).await.unwrap().unwrap();
        assert_eq!(balance.amount(), DEFAULT_BALANCE);
    }

    #[tokio::test]
    async fn test_register_cannot_grant_staff() {
        let (service, _) = create_service();

        let mut request = make_request("ivan@example.com", "secure_password123");
        request.is_staff = true;

        let user = service.register(request).await.unwrap();
        assert!(!user.is_staff());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (service, _) = create_service();

        let err = service
            .create(make_request("not-an-email", "secure_password123"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let err = service
            .create(make_request("ivan@example.com", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let (service, _) = create_service();

        service
            .create(make_request("ivan@example.com", "secure_password123"))
            .await
            .unwrap();

        let err = service
            .create(make_request("IVAN@example.com", "secure_password456"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (service, _) = create_service();
        service
            .create(make_request("ivan@example.com", "secure_password123"))
            .await
            .unwrap();

        let user = service
            .authenticate("Ivan@Example.com", "secure_password123")
            .await
            .unwrap()
            .unwrap();
        assert!(user.last_login_at().is_some());

        assert!(service
            .authenticate("ivan@example.com", "wrong_password")
            .await
            .unwrap()
            .is_none());
        assert!(service
            .authenticate("nobody@example.com", "secure_password123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_balance_and_subscriptions() {
        let (service, billing) = create_service();
        let user = service
            .create(make_request("ivan@example.com", "secure_password123"))
            .await
            .unwrap();

        let course_id = CourseId::generate();
        billing.get_or_create(user.id(), &course_id).await.unwrap();

        assert!(service.delete(user.id()).await.unwrap());

        assert!(service.get(user.id()).await.unwrap().is_none());
        assert!(billing.get_balance(user.id()).await.unwrap().is_none());
        assert!(!billing.exists(user.id(), &course_id).await.unwrap());
        assert!(!service.delete(user.id()).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_purchase_racing_user_delete_leaves_nothing_behind() {
        let users = Arc::new(InMemoryUserRepository::new());
        let store = Arc::new(InMemoryBillingStore::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        let service = Arc::new(UserService::new(
            users.clone(),
            store.clone(),
            Arc::new(Argon2Hasher::new()),
            DEFAULT_BALANCE,
        ));
        let billing = Arc::new(BillingService::new(store.clone(), courses.clone(), 0));

        let course = Course::new(
            CourseId::generate(),
            "Jane Doe",
            "Ownership in Practice",
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            1,
        )
        .unwrap();
        let course_id = *courses.create(course).await.unwrap().id();

        for i in 0..500 {
            let user = User::new(
                UserId::generate(),
                format!("student{i}@example.com"),
                "student",
                "Ivan",
                "Petrov",
                "hash",
            );
            let user_id = *users.create(user).await.unwrap().id();
            store.provision(&user_id, 10).await.unwrap();

            let buyer = {
                let billing = billing.clone();
                tokio::spawn(async move { billing.purchase(&user_id, &course_id).await })
            };
            let remover = {
                let service = service.clone();
                tokio::spawn(async move { service.delete(&user_id).await })
            };

            let purchased = buyer.await.unwrap();
            assert!(remover.await.unwrap().unwrap());

            if let Err(e) = purchased {
                assert!(
                    matches!(e, DomainError::NotFound { .. } | DomainError::NoBalance { .. }),
                    "unexpected error: {e}"
                );
            }
            assert!(!store.exists(&user_id, &course_id).await.unwrap());
            assert!(store.get_balance(&user_id).await.unwrap().is_none());
        }
    }
}
