//! Balance entity: a user's spendable point total

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Points granted to a newly provisioned balance
pub const DEFAULT_BALANCE: i64 = 1000;

/// Errors raised by balance mutations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BalanceError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(i64),

    #[error("Insufficient funds: balance {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    #[error("Balance is negative ({0}); refusing to operate on corrupted state")]
    Corrupted(i64),

    #[error("Balance would overflow")]
    Overflow,
}

impl From<BalanceError> for DomainError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::NegativeAmount(_) | BalanceError::Overflow => {
                DomainError::validation(err.to_string())
            }
            BalanceError::InsufficientFunds {
                available,
                required,
            } => DomainError::insufficient_funds(available, required),
            BalanceError::Corrupted(_) => DomainError::corrupted_balance(err.to_string()),
        }
    }
}

/// Per-user point balance. `amount` never goes below zero through `deduct`/`add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    user_id: UserId,
    amount: i64,
    updated_at: DateTime<Utc>,
}

impl Balance {
    pub fn new(user_id: UserId, amount: i64) -> Self {
        Self {
            user_id,
            amount,
            updated_at: Utc::now(),
        }
    }

    /// Restore a persisted balance
    pub fn restore(user_id: UserId, amount: i64, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            amount,
            updated_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Fails if the stored amount already violates the non-negative invariant
    pub fn ensure_consistent(&self) -> Result<(), BalanceError> {
        if self.amount < 0 {
            return Err(BalanceError::Corrupted(self.amount));
        }
        Ok(())
    }

    /// Whether `amount` can be deducted right now
    pub fn can_afford(&self, amount: i64) -> bool {
        self.amount >= 0 && amount >= 0 && self.amount >= amount
    }

    /// Deduct `amount` points
    pub fn deduct(&mut self, amount: i64) -> Result<(), BalanceError> {
        if amount < 0 {
            return Err(BalanceError::NegativeAmount(amount));
        }

        self.ensure_consistent()?;

        if amount > self.amount {
            return Err(BalanceError::InsufficientFunds {
                available: self.amount,
                required: amount,
            });
        }

        self.amount -= amount;
        self.touch();
        Ok(())
    }

    /// Add `amount` points
    pub fn add(&mut self, amount: i64) -> Result<(), BalanceError> {
        if amount < 0 {
            return Err(BalanceError::NegativeAmount(amount));
        }

        self.ensure_consistent()?;

        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(amount: i64) -> Balance {
        Balance::new(UserId::generate(), amount)
    }

    #[test]
    fn test_deduct_within_funds() {
        let mut b = balance(1000);
        b.deduct(300).unwrap();
        assert_eq!(b.amount(), 700);
    }

    #[test]
    fn test_deduct_exact_amount_leaves_zero() {
        let mut b = balance(500);
        b.deduct(500).unwrap();
        assert_eq!(b.amount(), 0);
    }

    #[test]
    fn test_deduct_insufficient_keeps_amount() {
        let mut b = balance(1000);
        let err = b.deduct(1200).unwrap_err();

        assert_eq!(
            err,
            BalanceError::InsufficientFunds {
                available: 1000,
                required: 1200
            }
        );
        assert_eq!(b.amount(), 1000);
    }

    #[test]
    fn test_positive_balance_is_not_rejected() {
        // A positive balance covering the amount must always be accepted.
        let mut b = balance(1);
        assert!(b.deduct(1).is_ok());
    }

    #[test]
    fn test_corrupted_balance_fails_loudly() {
        let mut b = balance(-5);
        assert_eq!(b.deduct(0), Err(BalanceError::Corrupted(-5)));
        assert_eq!(b.add(10), Err(BalanceError::Corrupted(-5)));
        assert_eq!(b.amount(), -5);
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut b = balance(100);
        assert_eq!(b.deduct(-1), Err(BalanceError::NegativeAmount(-1)));
        assert_eq!(b.add(-1), Err(BalanceError::NegativeAmount(-1)));
        assert_eq!(b.amount(), 100);
    }

    #[test]
    fn test_add() {
        let mut b = balance(100);
        b.add(250).unwrap();
        assert_eq!(b.amount(), 350);
    }

    #[test]
    fn test_add_overflow() {
        let mut b = balance(i64::MAX);
        assert_eq!(b.add(1), Err(BalanceError::Overflow));
    }

    #[test]
    fn test_can_afford() {
        let b = balance(300);
        assert!(b.can_afford(300));
        assert!(!b.can_afford(301));
        assert!(!balance(-1).can_afford(0));
    }

    #[test]
    fn test_domain_error_mapping() {
        let err: DomainError = BalanceError::InsufficientFunds {
            available: 1,
            required: 2,
        }
        .into();
        assert!(matches!(
            err,
            DomainError::InsufficientFunds {
                available: 1,
                required: 2
            }
        ));

        let err: DomainError = BalanceError::Corrupted(-1).into();
        assert!(matches!(err, DomainError::CorruptedBalance { .. }));
    }
}
