//! Billing infrastructure: balance/subscription stores and the purchase service

mod in_memory;
mod postgres;
mod service;

pub use in_memory::InMemoryBillingStore;
pub use postgres::PostgresBillingStore;
pub use service::BillingService;
