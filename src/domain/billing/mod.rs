//! Billing domain: the atomic purchase unit spanning balances and subscriptions

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::balance::BalanceRepository;
use crate::domain::course::{Course, CourseId};
use crate::domain::subscription::{SubscriptionId, SubscriptionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Result of a successful purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub subscription_id: SubscriptionId,
    pub course_id: CourseId,
    pub amount_charged: i64,
    pub remaining_balance: i64,
}

/// Storage that owns both balances and subscriptions, so that a purchase can
/// commit them together.
#[async_trait]
pub trait BillingStore: BalanceRepository + SubscriptionRepository {
    /// Deduct `course.price` from the user's balance and create the subscription
    /// as one all-or-nothing unit.
    ///
    /// Fails with, in order of precedence: `NotFound` (course or user already
    /// cascaded away), `NoBalance`, `CorruptedBalance`,
    /// `InsufficientFunds`, `AlreadySubscribed`. On any failure no write is
    /// observable. The balance check and the deduction happen under the same
    /// per-balance lock.
    async fn purchase(
        &self,
        user_id: &UserId,
        course: &Course,
    ) -> Result<PurchaseReceipt, DomainError>;
}
