//! Balance repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::Balance;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Storage for per-user balances. Every mutation is atomic per balance row.
#[async_trait]
pub trait BalanceRepository: Send + Sync + Debug {
    /// Get a user's balance, if one has been provisioned
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Balance>, DomainError>;

    /// Create a balance with `amount`, or return the existing one untouched
    async fn provision(&self, user_id: &UserId, amount: i64) -> Result<Balance, DomainError>;

    /// Atomically add `amount`; provisions `initial` first when no balance exists
    async fn deposit(
        &self,
        user_id: &UserId,
        amount: i64,
        initial: i64,
    ) -> Result<Balance, DomainError>;

    /// Remove a user's balance
    async fn delete_balance(&self, user_id: &UserId) -> Result<bool, DomainError>;
}
