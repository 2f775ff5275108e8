//! User, balance and subscription endpoints

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{authenticated_user, path_id};
use crate::api::auth::UserResponse;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::access::AdminOnly;
use crate::domain::{AccessPolicy, Action, Balance, Caller, Subscription, UserId};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: String,
    pub amount: i64,
    pub updated_at: String,
}

impl From<&Balance> for BalanceResponse {
    fn from(balance: &Balance) -> Self {
        Self {
            user_id: balance.user_id().to_string(),
            amount: balance.amount(),
            updated_at: balance.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub course_id: String,
    pub subscription_date: String,
    pub created_at: String,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id().to_string(),
            course_id: subscription.course_id().to_string(),
            subscription_date: subscription.subscription_date().to_string(),
            created_at: subscription.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListSubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: i64,
}

/// GET /api/v1/users/me/balance
pub async fn get_my_balance(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user = authenticated_user(&caller, Action::Retrieve)?;

    let balance = state
        .billing_service
        .balance(user.id())
        .await?
        .ok_or_else(|| ApiError::not_found("No balance exists for this user"))?;

    Ok(Json(BalanceResponse::from(&balance)))
}

/// GET /api/v1/users/me/subscriptions
pub async fn list_my_subscriptions(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ListSubscriptionsResponse>, ApiError> {
    let user = authenticated_user(&caller, Action::List)?;

    let subscriptions = state.billing_service.subscriptions(user.id()).await?;
    let subscriptions: Vec<SubscriptionResponse> =
        subscriptions.iter().map(SubscriptionResponse::from).collect();
    let total = subscriptions.len();

    Ok(Json(ListSubscriptionsResponse {
        subscriptions,
        total,
    }))
}

/// POST /api/v1/users/{user_id}/balance/deposit
pub async fn deposit_balance(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    AdminOnly.authorize(&caller, Action::Update)?;
    let user_id = path_id(&user_id, UserId::parse)?;

    state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", user_id)))?;

    let balance = state
        .billing_service
        .deposit(&user_id, request.amount)
        .await?;

    Ok(Json(BalanceResponse::from(&balance)))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ListUsersResponse>, ApiError> {
    AdminOnly.authorize(&caller, Action::List)?;

    let users = state.user_service.list().await?;
    let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    let total = users.len();

    Ok(Json(ListUsersResponse { users, total }))
}

/// DELETE /api/v1/users/{user_id}
///
/// Removes the user's balance and subscriptions as well.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    AdminOnly.authorize(&caller, Action::Destroy)?;
    let user_id = path_id(&user_id, UserId::parse)?;

    if caller.user().is_some_and(|admin| admin.id() == &user_id) {
        return Err(ApiError::bad_request("Admins cannot delete their own account"));
    }

    if !state.user_service.delete(&user_id).await? {
        return Err(ApiError::not_found(format!("User '{}' not found", user_id)));
    }

    info!(user_id = %user_id, "User deleted");

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": user_id.to_string()
    })))
}
