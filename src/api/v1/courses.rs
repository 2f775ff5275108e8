//! Course endpoints
//!
//! Anyone may read the catalog; only admins may change it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{authenticated_user, path_id};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::access::ReadOnlyOrAdmin;
use crate::domain::{AccessPolicy, Action, Caller, Course, CourseId};
use crate::infrastructure::catalog::{CreateCourseRequest, UpdateCourseRequest};

const POLICY: ReadOnlyOrAdmin = ReadOnlyOrAdmin;

/// Course response
#[derive(Debug, Clone, Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub author: String,
    pub title: String,
    pub start_date: String,
    pub price: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id().to_string(),
            author: course.author().to_string(),
            title: course.title().to_string(),
            start_date: course.start_date().to_string(),
            price: course.price(),
            created_at: course.created_at().to_rfc3339(),
            updated_at: course.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListCoursesResponse {
    pub courses: Vec<CourseResponse>,
    pub total: usize,
}

/// Body of a successful `/courses/{course_id}/pay`
#[derive(Debug, Serialize)]
pub struct PayResponse {
    pub message: String,
    pub course_id: String,
    pub subscription_id: String,
}

/// GET /api/v1/courses
pub async fn list_courses(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ListCoursesResponse>, ApiError> {
    POLICY.authorize(&caller, Action::List)?;

    let courses = state.catalog_service.list_courses().await?;
    let courses: Vec<CourseResponse> = courses.iter().map(CourseResponse::from).collect();
    let total = courses.len();

    Ok(Json(ListCoursesResponse { courses, total }))
}

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    POLICY.authorize(&caller, Action::Create)?;

    let course = state.catalog_service.create_course(request).await?;

    info!(course_id = %course.id(), title = %course.title(), "Course created");

    Ok((StatusCode::CREATED, Json(CourseResponse::from(&course))))
}

/// GET /api/v1/courses/{course_id}
pub async fn get_course(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    POLICY.authorize(&caller, Action::Retrieve)?;

    let course_id = path_id(&course_id, CourseId::parse)?;
    let course = state.catalog_service.require_course(&course_id).await?;

    Ok(Json(CourseResponse::from(&course)))
}

/// PATCH /api/v1/courses/{course_id}
pub async fn update_course(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    POLICY.authorize(&caller, Action::Update)?;

    let course_id = path_id(&course_id, CourseId::parse)?;
    debug!(course_id = %course_id, "Updating course");

    let course = state
        .catalog_service
        .update_course(&course_id, request)
        .await?;

    Ok(Json(CourseResponse::from(&course)))
}

/// DELETE /api/v1/courses/{course_id}
///
/// Lessons, groups and subscriptions of the course go with it.
pub async fn delete_course(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    POLICY.authorize(&caller, Action::Destroy)?;

    let course_id = path_id(&course_id, CourseId::parse)?;

    if !state.catalog_service.delete_course(&course_id).await? {
        return Err(ApiError::not_found(format!(
            "Course '{}' not found",
            course_id
        )));
    }

    info!(course_id = %course_id, "Course deleted");

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": course_id.to_string()
    })))
}

/// POST /api/v1/courses/{course_id}/pay
///
/// Buys the course for the caller.
pub async fn pay_for_course(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<(StatusCode, Json<PayResponse>), ApiError> {
    let user = authenticated_user(&caller, Action::Pay)?;
    let course_id = path_id(&course_id, CourseId::parse)?;

    let receipt = state
        .billing_service
        .purchase(user.id(), &course_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PayResponse {
            message: "Payment successful, subscription created".to_string(),
            course_id: receipt.course_id.to_string(),
            subscription_id: receipt.subscription_id.to_string(),
        }),
    ))
}
