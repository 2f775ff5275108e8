//! Balance ledger domain

mod entity;
mod repository;

pub use entity::{Balance, BalanceError, DEFAULT_BALANCE};
pub use repository::BalanceRepository;
