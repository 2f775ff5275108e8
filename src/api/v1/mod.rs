//! Course marketplace v1 API endpoints

pub mod courses;
pub mod groups;
pub mod lessons;
pub mod payment;
pub mod users;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;
use super::types::ApiError;
use crate::domain::access::Authenticated;
use crate::domain::{AccessPolicy, AccessTarget, Action, Caller, CourseId, DomainError, User};

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/payment", post(payment::create_payment))
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/{course_id}",
            get(courses::get_course)
                .patch(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/courses/{course_id}/pay", post(courses::pay_for_course))
        .route(
            "/courses/{course_id}/lessons",
            get(lessons::list_lessons).post(lessons::create_lesson),
        )
        .route(
            "/courses/{course_id}/lessons/{lesson_id}",
            get(lessons::get_lesson)
                .patch(lessons::update_lesson)
                .delete(lessons::delete_lesson),
        )
        .route(
            "/courses/{course_id}/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/courses/{course_id}/groups/{group_id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/users", get(users::list_users))
        .route("/users/me/balance", get(users::get_my_balance))
        .route("/users/me/subscriptions", get(users::list_my_subscriptions))
        .route(
            "/users/{user_id}/balance/deposit",
            post(users::deposit_balance),
        )
        .route("/users/{user_id}", delete(users::delete_user))
}

/// Parse an id captured from the URL. A malformed id names no resource,
/// so it is a 404 like any other unknown id.
pub(crate) fn path_id<T>(
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, DomainError>,
) -> Result<T, ApiError> {
    parse(raw).map_err(|_| ApiError::not_found(format!("'{}' not found", raw)))
}

/// Require an authenticated caller and hand back their user
pub(crate) fn authenticated_user(caller: &Caller, action: Action) -> Result<&User, ApiError> {
    Authenticated.authorize(caller, action)?;

    caller
        .user()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Build the object-level target for a course.
///
/// Subscription status is only looked up for authenticated non-admins; it is
/// irrelevant for everyone else.
pub(crate) async fn course_target(
    state: &AppState,
    caller: &Caller,
    course_id: &CourseId,
) -> Result<AccessTarget, ApiError> {
    let subscribed = match caller.user() {
        Some(user) if !caller.is_admin() => {
            state
                .billing_service
                .is_subscribed(user.id(), course_id)
                .await?
        }
        _ => false,
    };

    Ok(AccessTarget::new(*course_id, subscribed))
}
