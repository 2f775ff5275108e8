//! Standalone payment endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::authenticated_user;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Action, Caller, CourseId};

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Optional so that a missing id gets a field-specific error
    #[serde(default)]
    pub course_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub status: String,
    pub subscription_id: String,
    pub remaining_balance: i64,
}

/// POST /api/v1/payment
///
/// Buys the course named in the body for the caller.
pub async fn create_payment(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let user = authenticated_user(&caller, Action::Pay)?;

    let course_id = request
        .course_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Course ID is required").with_param("course_id"))?;
    let course_id = CourseId::parse(course_id)
        .map_err(|e| ApiError::from(e).with_param("course_id"))?;

    let receipt = state
        .billing_service
        .purchase(user.id(), &course_id)
        .await?;

    Ok(Json(PaymentResponse {
        status: "Payment successful, subscription created".to_string(),
        subscription_id: receipt.subscription_id.to_string(),
        remaining_balance: receipt.remaining_balance,
    }))
}
