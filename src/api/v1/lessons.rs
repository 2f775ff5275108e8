//! Lesson endpoints, nested under a course
//!
//! Admins see every course's lessons; other callers need a subscription to
//! the parent course.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

use super::{course_target, path_id};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::access::SubscriberOrAdmin;
use crate::domain::{AccessPolicy, Action, Caller, CourseId, Lesson, LessonId};
use crate::infrastructure::catalog::{CreateLessonRequest, UpdateLessonRequest};

const POLICY: SubscriberOrAdmin = SubscriberOrAdmin;

#[derive(Debug, Clone, Serialize)]
pub struct LessonResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub link: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Lesson> for LessonResponse {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id().to_string(),
            course_id: lesson.course_id().to_string(),
            title: lesson.title().to_string(),
            link: lesson.link().to_string(),
            created_at: lesson.created_at().to_rfc3339(),
            updated_at: lesson.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListLessonsResponse {
    pub lessons: Vec<LessonResponse>,
    pub total: usize,
}

/// Collection check, course lookup, then the subscription check
async fn authorize(
    state: &AppState,
    caller: &Caller,
    action: Action,
    course_id: &str,
) -> Result<CourseId, ApiError> {
    POLICY.authorize(caller, action)?;

    let course_id = path_id(course_id, CourseId::parse)?;
    state.catalog_service.require_course(&course_id).await?;

    let target = course_target(state, caller, &course_id).await?;
    POLICY.authorize_object(caller, action, &target)?;

    Ok(course_id)
}

/// GET /api/v1/courses/{course_id}/lessons
pub async fn list_lessons(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<Json<ListLessonsResponse>, ApiError> {
    let course_id = authorize(&state, &caller, Action::List, &course_id).await?;

    let lessons = state.catalog_service.list_lessons(&course_id).await?;
    let lessons: Vec<LessonResponse> = lessons.iter().map(LessonResponse::from).collect();
    let total = lessons.len();

    Ok(Json(ListLessonsResponse { lessons, total }))
}

/// POST /api/v1/courses/{course_id}/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
    Json(request): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    let course_id = authorize(&state, &caller, Action::Create, &course_id).await?;

    let lesson = state
        .catalog_service
        .create_lesson(&course_id, request)
        .await?;

    info!(course_id = %course_id, lesson_id = %lesson.id(), "Lesson created");

    Ok((StatusCode::CREATED, Json(LessonResponse::from(&lesson))))
}

/// GET /api/v1/courses/{course_id}/lessons/{lesson_id}
pub async fn get_lesson(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<LessonResponse>, ApiError> {
    let course_id = authorize(&state, &caller, Action::Retrieve, &course_id).await?;
    let lesson_id = path_id(&lesson_id, LessonId::parse)?;

    let lesson = state
        .catalog_service
        .get_lesson(&course_id, &lesson_id)
        .await?;

    Ok(Json(LessonResponse::from(&lesson)))
}

/// PATCH /api/v1/courses/{course_id}/lessons/{lesson_id}
pub async fn update_lesson(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, lesson_id)): Path<(String, String)>,
    Json(request): Json<UpdateLessonRequest>,
) -> Result<Json<LessonResponse>, ApiError> {
    let course_id = authorize(&state, &caller, Action::Update, &course_id).await?;
    let lesson_id = path_id(&lesson_id, LessonId::parse)?;

    let lesson = state
        .catalog_service
        .update_lesson(&course_id, &lesson_id, request)
        .await?;

    Ok(Json(LessonResponse::from(&lesson)))
}

/// DELETE /api/v1/courses/{course_id}/lessons/{lesson_id}
pub async fn delete_lesson(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, lesson_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let course_id = authorize(&state, &caller, Action::Destroy, &course_id).await?;
    let lesson_id = path_id(&lesson_id, LessonId::parse)?;

    if !state
        .catalog_service
        .delete_lesson(&course_id, &lesson_id)
        .await?
    {
        return Err(ApiError::not_found(format!(
            "Lesson '{}' not found",
            lesson_id
        )));
    }

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": lesson_id.to_string()
    })))
}
