//! Subscription registry domain

mod entity;
mod repository;

pub use entity::{sort_newest_first, Subscription, SubscriptionId};
pub use repository::SubscriptionRepository;
