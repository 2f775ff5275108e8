//! Subscription registry trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::Subscription;
use crate::domain::course::CourseId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Registry of (user, course) grants. Uniqueness of the pair is enforced by storage.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync + Debug {
    /// Return the existing subscription or create one; the flag is `true` when created
    async fn get_or_create(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<(Subscription, bool), DomainError>;

    /// Whether the user is subscribed to the course
    async fn exists(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, DomainError>;

    /// A user's subscriptions, newest first
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError>;

    /// Remove every subscription to a course that is being deleted. No
    /// subscription created afterwards may outlive the course row.
    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError>;

    /// Same as [`Self::delete_for_course`], for a user being deleted
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, DomainError>;
}
