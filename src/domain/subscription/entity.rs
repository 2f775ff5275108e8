//! Subscription entity: a user's access grant to a course

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::course::CourseId;
use crate::domain::id::uuid_id;
use crate::domain::user::UserId;

uuid_id!(
    /// Subscription identifier
    SubscriptionId,
    "subscription"
);

/// Grant of a user's access to a course. At most one exists per (user, course).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    id: SubscriptionId,
    user_id: UserId,
    course_id: CourseId,
    subscription_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl Subscription {
    /// A new subscription dated today
    pub fn new(user_id: UserId, course_id: CourseId) -> Self {
        let now = Utc::now();

        Self {
            id: SubscriptionId::generate(),
            user_id,
            course_id,
            subscription_date: now.date_naive(),
            created_at: now,
        }
    }

    /// Restore a persisted subscription
    pub fn restore(
        id: SubscriptionId,
        user_id: UserId,
        course_id: CourseId,
        subscription_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            course_id,
            subscription_date,
            created_at,
        }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn subscription_date(&self) -> NaiveDate {
        self.subscription_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Newest subscriptions first
pub fn sort_newest_first(subscriptions: &mut [Subscription]) {
    subscriptions.sort_by(|a, b| {
        b.subscription_date
            .cmp(&a.subscription_date)
            .then(b.created_at.cmp(&a.created_at))
    });
}
