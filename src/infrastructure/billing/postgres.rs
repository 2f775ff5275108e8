//! PostgreSQL billing store
//!
//! A purchase runs in one transaction: the balance row is locked with
//! `SELECT ... FOR UPDATE`, the subscription is inserted with
//! `ON CONFLICT DO NOTHING`, and any failure rolls everything back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::domain::balance::{Balance, BalanceRepository};
use crate::domain::billing::{BillingStore, PurchaseReceipt};
use crate::domain::course::{Course, CourseId};
use crate::domain::subscription::{Subscription, SubscriptionId, SubscriptionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{
    is_check_violation, is_foreign_key_violation, is_unique_violation,
};

/// PostgreSQL implementation of BillingStore
#[derive(Debug, Clone)]
pub struct PostgresBillingStore {
    pool: PgPool,
}

impl PostgresBillingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_err(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::storage(format!("{}: {}", context, e))
}

/// Lock and load a balance row inside the caller's transaction
async fn lock_balance(
    conn: &mut PgConnection,
    user_id: &UserId,
) -> Result<Option<Balance>, DomainError> {
    let row = sqlx::query(
        "SELECT user_id, amount, updated_at FROM balances WHERE user_id = $1 FOR UPDATE",
    )
    .bind(*user_id.as_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_err("Failed to lock balance"))?;

    row.as_ref().map(row_to_balance).transpose()
}

async fn store_balance(conn: &mut PgConnection, balance: &Balance) -> Result<(), DomainError> {
    sqlx::query("UPDATE balances SET amount = $2, updated_at = $3 WHERE user_id = $1")
        .bind(*balance.user_id().as_uuid())
        .bind(balance.amount())
        .bind(balance.updated_at())
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_check_violation(&e) {
                DomainError::corrupted_balance(format!(
                    "Balance of user '{}' would become negative",
                    balance.user_id()
                ))
            } else {
                DomainError::storage(format!("Failed to update balance: {}", e))
            }
        })?;

    Ok(())
}

#[async_trait]
impl BalanceRepository for PostgresBillingStore {
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Balance>, DomainError> {
        let row = sqlx::query("SELECT user_id, amount, updated_at FROM balances WHERE user_id = $1")
            .bind(*user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err("Failed to get balance"))?;

        row.as_ref().map(row_to_balance).transpose()
    }

    async fn provision(&self, user_id: &UserId, amount: i64) -> Result<Balance, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation(format!(
                "Initial balance cannot be negative: {}",
                amount
            )));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO balances (user_id, amount, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, amount, updated_at
            "#,
        )
        .bind(*user_id.as_uuid())
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DomainError::not_found(format!("User '{}' not found", user_id))
            } else {
                DomainError::storage(format!("Failed to provision balance: {}", e))
            }
        })?;

        row_to_balance(&row)
    }

    async fn deposit(
        &self,
        user_id: &UserId,
        amount: i64,
        initial: i64,
    ) -> Result<Balance, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_err("Failed to begin transaction"))?;

        sqlx::query(
            "INSERT INTO balances (user_id, amount) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(*user_id.as_uuid())
        .bind(initial)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DomainError::not_found(format!("User '{}' not found", user_id))
            } else {
                DomainError::storage(format!("Failed to provision balance: {}", e))
            }
        })?;

        let Some(mut balance) = lock_balance(&mut tx, user_id).await? else {
            tx.rollback().await.ok();
            return Err(DomainError::no_balance(format!(
                "User '{}' has no balance",
                user_id
            )));
        };

        if let Err(e) = balance.add(amount) {
            tx.rollback().await.ok();
            return Err(e.into());
        }

        store_balance(&mut tx, &balance).await?;

        tx.commit()
            .await
            .map_err(storage_err("Failed to commit deposit"))?;

        Ok(balance)
    }

    async fn delete_balance(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM balances WHERE user_id = $1")
            .bind(*user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete balance"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresBillingStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<(Subscription, bool), DomainError> {
        let subscription = Subscription::new(*user_id, *course_id);

        let inserted = sqlx::query(
            r#"
            INSERT INTO subscriptions (id, user_id, course_id, subscription_date, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(*subscription.id().as_uuid())
        .bind(*user_id.as_uuid())
        .bind(*course_id.as_uuid())
        .bind(subscription.subscription_date())
        .bind(subscription.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DomainError::not_found(format!("Course '{}' or user '{}' not found", course_id, user_id))
            } else {
                DomainError::storage(format!("Failed to create subscription: {}", e))
            }
        })?;

        if inserted.rows_affected() > 0 {
            return Ok((subscription, true));
        }

        let row = sqlx::query(
            r#"
            SELECT id, user_id, course_id, subscription_date, created_at
            FROM subscriptions
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(*user_id.as_uuid())
        .bind(*course_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err("Failed to load subscription"))?;

        Ok((row_to_subscription(&row)?, false))
    }

    async fn exists(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(*user_id.as_uuid())
        .bind(*course_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err("Failed to check subscription"))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, course_id, subscription_date, created_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY subscription_date DESC, created_at DESC
            "#,
        )
        .bind(*user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("Failed to list subscriptions"))?;

        rows.iter().map(row_to_subscription).collect()
    }

    async fn delete_for_course(&self, course_id: &CourseId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE course_id = $1")
            .bind(*course_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete course subscriptions"))?;

        Ok(result.rows_affected())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1")
            .bind(*user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err("Failed to delete user subscriptions"))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BillingStore for PostgresBillingStore {
    async fn purchase(
        &self,
        user_id: &UserId,
        course: &Course,
    ) -> Result<PurchaseReceipt, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_err("Failed to begin transaction"))?;

        let Some(mut balance) = lock_balance(&mut tx, user_id).await? else {
            tx.rollback().await.ok();
            return Err(DomainError::no_balance(format!(
                "User '{}' has no balance",
                user_id
            )));
        };

        if let Err(e) = balance.deduct(course.price()) {
            tx.rollback().await.ok();
            return Err(e.into());
        }

        let subscription_id = SubscriptionId::generate();
        let today = Utc::now().date_naive();

        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO subscriptions (id, user_id, course_id, subscription_date, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(*subscription_id.as_uuid())
        .bind(*user_id.as_uuid())
        .bind(*course.id().as_uuid())
        .bind(today)
        .fetch_optional(&mut *tx)
        .await;

        let already_subscribed = || {
            DomainError::already_subscribed(format!(
                "User '{}' is already subscribed to course '{}'",
                user_id,
                course.id()
            ))
        };

        match inserted {
            Ok(Some(_)) => {}
            Ok(None) => {
                tx.rollback().await.ok();
                return Err(already_subscribed());
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await.ok();
                return Err(already_subscribed());
            }
            Err(e) if is_foreign_key_violation(&e) => {
                tx.rollback().await.ok();
                return Err(DomainError::not_found(format!(
                    "Course '{}' not found",
                    course.id()
                )));
            }
            Err(e) => {
                tx.rollback().await.ok();
                return Err(DomainError::storage(format!(
                    "Failed to create subscription: {}",
                    e
                )));
            }
        }

        store_balance(&mut tx, &balance).await?;

        tx.commit()
            .await
            .map_err(storage_err("Failed to commit purchase"))?;

        Ok(PurchaseReceipt {
            subscription_id,
            course_id: *course.id(),
            amount_charged: course.price(),
            remaining_balance: balance.amount(),
        })
    }
}

fn row_to_balance(row: &PgRow) -> Result<Balance, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Malformed balance row: {}", e));

    let user_id: Uuid = row.try_get("user_id").map_err(read)?;
    let amount: i64 = row.try_get("amount").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Ok(Balance::restore(UserId::from_uuid(user_id), amount, updated_at))
}

fn row_to_subscription(row: &PgRow) -> Result<Subscription, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Malformed subscription row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let user_id: Uuid = row.try_get("user_id").map_err(read)?;
    let course_id: Uuid = row.try_get("course_id").map_err(read)?;
    let subscription_date: NaiveDate = row.try_get("subscription_date").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(Subscription::restore(
        SubscriptionId::from_uuid(id),
        UserId::from_uuid(user_id),
        CourseId::from_uuid(course_id),
        subscription_date,
        created_at,
    ))
}
