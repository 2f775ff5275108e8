//! Billing service: purchases, balances and subscription lookups

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::balance::Balance;
use crate::domain::billing::{BillingStore, PurchaseReceipt};
use crate::domain::course::{CourseId, CourseRepository};
use crate::domain::subscription::Subscription;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_purchase;

/// Orchestrates purchases against a billing store and the course catalog
pub struct BillingService<B: BillingStore, C: CourseRepository> {
    store: Arc<B>,
    courses: Arc<C>,
    initial_balance: i64,
}

impl<B: BillingStore, C: CourseRepository> BillingService<B, C> {
    pub fn new(store: Arc<B>, courses: Arc<C>, initial_balance: i64) -> Self {
        Self {
            store,
            courses,
            initial_balance,
        }
    }

    /// Buy access to a course
    ///
    /// The course is loaded first (`NotFound`), then the store runs the
    /// balance check, deduction and subscription creation as one unit.
    pub async fn purchase(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<PurchaseReceipt, DomainError> {
        let result = self.run_purchase(user_id, course_id).await;

        match &result {
            Ok(receipt) => {
                info!(
                    user_id = %user_id,
                    course_id = %course_id,
                    subscription_id = %receipt.subscription_id,
                    amount = receipt.amount_charged,
                    remaining = receipt.remaining_balance,
                    "Course purchased"
                );
                record_purchase("success");
            }
            Err(e @ DomainError::CorruptedBalance { .. }) => {
                error!(user_id = %user_id, course_id = %course_id, error = %e, "Purchase refused");
                record_purchase(e.kind());
            }
            Err(e) => {
                warn!(user_id = %user_id, course_id = %course_id, error = %e, "Purchase failed");
                record_purchase(e.kind());
            }
        }

        result
    }

    async fn run_purchase(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<PurchaseReceipt, DomainError> {
        let course = self
            .courses
            .get(course_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Course '{}' not found", course_id)))?;

        self.store.purchase(user_id, &course).await
    }

    pub async fn balance(&self, user_id: &UserId) -> Result<Option<Balance>, DomainError> {
        self.store.get_balance(user_id).await
    }

    /// Add points to a user's balance, provisioning it first if needed
    pub async fn deposit(&self, user_id: &UserId, amount: i64) -> Result<Balance, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation(format!(
                "Deposit amount cannot be negative: {}",
                amount
            )));
        }

        let balance = self
            .store
            .deposit(user_id, amount, self.initial_balance)
            .await?;

        info!(user_id = %user_id, amount, balance = balance.amount(), "Balance deposited");

        Ok(balance)
    }

    /// A user's subscriptions, newest first
    pub async fn subscriptions(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        self.store.list_for_user(user_id).await
    }

    pub async fn is_subscribed(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        self.store.exists(user_id, course_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::balance::BalanceRepository;
    use crate::domain::course::{Course, MockCourseRepository};
    use crate::infrastructure::billing::InMemoryBillingStore;
    use chrono::NaiveDate;

    fn course(price: i64) -> Course {
        Course::new(
            CourseId::generate(),
            "Jane Doe",
            "Async Rust",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            price,
        )
        .unwrap()
    }

    fn service_with(
        course: Option<Course>,
    ) -> (
        BillingService<InMemoryBillingStore, MockCourseRepository>,
        Arc<InMemoryBillingStore>,
    ) {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_get()
            .returning(move |_| Ok(course.clone()));

        let store = Arc::new(InMemoryBillingStore::new());
        (
            BillingService::new(store.clone(), Arc::new(courses), 1000),
            store,
        )
    }

    #[tokio::test]
    async fn test_purchase_unknown_course() {
        let (service, store) = service_with(None);
        let user_id = UserId::generate();
        store.provision(&user_id, 1000).await.unwrap();

        let err = service
            .purchase(&user_id, &CourseId::generate())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(store.get_balance(&user_id).await.unwrap().unwrap().amount(), 1000);
    }

    #[tokio::test]
    async fn test_not_found_takes_precedence_over_no_balance() {
        let (service, _) = service_with(None);

        let err = service
            .purchase(&UserId::generate(), &CourseId::generate())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_purchase_and_lookup() {
        let course = course(300);
        let course_id = *course.id();
        let (service, store) = service_with(Some(course));
        let user_id = UserId::generate();
        store.provision(&user_id, 1000).await.unwrap();

        let receipt = service.purchase(&user_id, &course_id).await.unwrap();

        assert_eq!(receipt.remaining_balance, 700);
        assert!(service.is_subscribed(&user_id, &course_id).await.unwrap());
        assert_eq!(service.balance(&user_id).await.unwrap().unwrap().amount(), 700);

        let subscriptions = service.subscriptions(&user_id).await.unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].id(), &receipt.subscription_id);
    }

    #[tokio::test]
    async fn test_deposit() {
        let (service, _) = service_with(None);
        let user_id = UserId::generate();

        let balance = service.deposit(&user_id, 500).await.unwrap();
        assert_eq!(balance.amount(), 1500);

        let err = service.deposit(&user_id, -10).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
