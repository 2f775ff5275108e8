//! Domain layer - Core business logic and entities

pub mod access;
pub mod balance;
pub mod billing;
pub mod course;
pub mod error;
mod id;
pub mod subscription;
pub mod user;

pub use access::{AccessPolicy, AccessTarget, Action, Caller};
pub use balance::{Balance, BalanceError, BalanceRepository, DEFAULT_BALANCE};
pub use billing::{BillingStore, PurchaseReceipt};
pub use course::{
    Course, CourseId, CourseRepository, Group, GroupId, GroupRepository, Lesson, LessonId,
    LessonRepository,
};
pub use error::DomainError;
pub use subscription::{Subscription, SubscriptionId, SubscriptionRepository};
pub use user::{User, UserId, UserRepository};
