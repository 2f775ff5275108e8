//! In-memory billing store
//!
//! Balances and subscriptions share one mutex, so a purchase observes and
//! mutates both under a single lock. Deleted courses and users are remembered
//! under the same lock so that a purchase racing a cascade cannot recreate
//! their rows.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::balance::{Balance, BalanceRepository};
use crate::domain::billing::{BillingStore, PurchaseReceipt};
use crate::domain::course::{Course, CourseId};
use crate::domain::subscription::{sort_newest_first, Subscription, SubscriptionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct BillingState {
    balances: HashMap<UserId, Balance>,
    subscriptions: HashMap<(UserId, CourseId), Subscription>,
    deleted_courses: HashSet<CourseId>,
    deleted_users: HashSet<UserId>,
}

impl BillingState {
    fn ensure_live_user(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.deleted_users.contains(user_id) {
            return Err(DomainError::not_found(format!("User '{}' not found", user_id)));
        }
        Ok(())
    }

    fn ensure_live_course(&self, course_id: &CourseId) -> Result<(), DomainError> {
        if self.deleted_courses.contains(course_id) {
            return Err(DomainError::not_found(format!("Course '{}' not found", course_id)));
        }
        Ok(())
    }
}

/// In-memory implementation of BillingStore
#[derive(Debug, Default, Clone)]
pub struct InMemoryBillingStore {
    state: Arc<Mutex<BillingState>>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceRepository for InMemoryBillingStore {
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Balance>, DomainError> {
        Ok(self.state.lock().await.balances.get(user_id).cloned())
    }

    async fn provision(&self, user_id: &UserId, amount: i64) -> Result<Balance, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation(format!(
                "Initial balance cannot be negative: {}",
                amount
            )));
        }

        let mut state = self.state.lock().await;
        state.ensure_live_user(user_id)?;

        let balance = state
            .balances
            .entry(*user_id)
            .or_insert_with(|| Balance::new(*user_id, amount));

        Ok(balance.clone())
    }

    async fn deposit(
        &self,
        user_id: &UserId,
        amount: i64,
        initial: i64,
    ) -> Result<Balance, DomainError> {
        let mut state = self.state.lock().await;
        state.ensure_live_user(user_id)?;

        let mut balance = state
            .balances
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Balance::new(*user_id, initial));

        balance.add(amount)?;
        state.balances.insert(*user_id, balance.clone());

        Ok(balance)
    }

    async fn delete_balance(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.state.lock().await.balances.remove(user_id).is_some())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryBillingStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<(Subscription, bool), DomainError> {
        let mut state = self.state.lock().await;
        state.ensure_live_user(user_id)?;
        state.ensure_live_course(course_id)?;

        if let Some(existing) = state.subscriptions.get(&(*user_id, *course_id)) {
            return Ok((existing.clone(), false));
        }

        let subscription = Subscription::new(*user_id, *course_id);
        state
            .subscriptions
            .insert((*user_id, *course_id), subscription.clone());

        Ok((subscription, true))
    }

    async fn exists(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .subscriptions
            .contains_key(&(*user_id, *course_id)))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let state = self.state.lock().await;

        let mut subscriptions: Vec<Subscription> = state
            .subscriptions
            .values()
            .filter(|s| s.user_id() == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut subscriptions);

        Ok(subscriptions)
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        let mut state = self.state.lock().await;
        state.deleted_courses.insert(*course_id);

        let before = state.subscriptions.len();
        state.subscriptions.retain(|(_, course), _| course != course_id);

        Ok((before - state.subscriptions.len()) as u64)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let mut state = self.state.lock().await;
        state.deleted_users.insert(*user_id);

        let before = state.subscriptions.len();
        state.subscriptions.retain(|(user, _), _| user != user_id);

        Ok((before - state.subscriptions.len()) as u64)
    }
}

#[async_trait]
impl BillingStore for InMemoryBillingStore {
    async fn purchase(
        &self,
        user_id: &UserId,
        course: &Course,
    ) -> Result<PurchaseReceipt, DomainError> {
        let mut state = self.state.lock().await;
        state.ensure_live_course(course.id())?;
        state.ensure_live_user(user_id)?;

        let mut balance = state
            .balances
            .get(user_id)
            .cloned()
            .ok_or_else(|| DomainError::no_balance(format!("User '{}' has no balance", user_id)))?;

        // Deduct on a copy; nothing is written until every check has passed
        balance.deduct(course.price())?;

        let key = (*user_id, *course.id());
        if state.subscriptions.contains_key(&key) {
            return Err(DomainError::already_subscribed(format!(
                "User '{}' is already subscribed to course '{}'",
                user_id,
                course.id()
            )));
        }

        let subscription = Subscription::new(*user_id, *course.id());
        let receipt = PurchaseReceipt {
            subscription_id: *subscription.id(),
            course_id: *course.id(),
            amount_charged: course.price(),
            remaining_balance: balance.amount(),
        };

        state.balances.insert(*user_id, balance);
        state.subscriptions.insert(key, subscription);

        Ok(receipt)
    }
}
