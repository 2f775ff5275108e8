//! Group endpoints, nested under a course. Admin only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

use super::path_id;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::access::AdminOnly;
use crate::domain::{AccessPolicy, Action, Caller, CourseId, Group, GroupId};
use crate::infrastructure::catalog::{CreateGroupRequest, UpdateGroupRequest};

const POLICY: AdminOnly = AdminOnly;

#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id().to_string(),
            course_id: group.course_id().to_string(),
            title: group.title().to_string(),
            created_at: group.created_at().to_rfc3339(),
            updated_at: group.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListGroupsResponse {
    pub groups: Vec<GroupResponse>,
    pub total: usize,
}

/// GET /api/v1/courses/{course_id}/groups
pub async fn list_groups(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    POLICY.authorize(&caller, Action::List)?;
    let course_id = path_id(&course_id, CourseId::parse)?;

    let groups = state.catalog_service.list_groups(&course_id).await?;
    let groups: Vec<GroupResponse> = groups.iter().map(GroupResponse::from).collect();
    let total = groups.len();

    Ok(Json(ListGroupsResponse { groups, total }))
}

/// POST /api/v1/courses/{course_id}/groups
pub async fn create_group(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    POLICY.authorize(&caller, Action::Create)?;
    let course_id = path_id(&course_id, CourseId::parse)?;

    let group = state
        .catalog_service
        .create_group(&course_id, request)
        .await?;

    info!(course_id = %course_id, group_id = %group.id(), "Group created");

    Ok((StatusCode::CREATED, Json(GroupResponse::from(&group))))
}

/// GET /api/v1/courses/{course_id}/groups/{group_id}
pub async fn get_group(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, group_id)): Path<(String, String)>,
) -> Result<Json<GroupResponse>, ApiError> {
    POLICY.authorize(&caller, Action::Retrieve)?;
    let course_id = path_id(&course_id, CourseId::parse)?;
    let group_id = path_id(&group_id, GroupId::parse)?;

    let group = state.catalog_service.get_group(&course_id, &group_id).await?;

    Ok(Json(GroupResponse::from(&group)))
}

/// PATCH /api/v1/courses/{course_id}/groups/{group_id}
pub async fn update_group(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, group_id)): Path<(String, String)>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    POLICY.authorize(&caller, Action::Update)?;
    let course_id = path_id(&course_id, CourseId::parse)?;
    let group_id = path_id(&group_id, GroupId::parse)?;

    let group = state
        .catalog_service
        .update_group(&course_id, &group_id, request)
        .await?;

    Ok(Json(GroupResponse::from(&group)))
}

/// DELETE /api/v1/courses/{course_id}/groups/{group_id}
pub async fn delete_group(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, group_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    POLICY.authorize(&caller, Action::Destroy)?;
    let course_id = path_id(&course_id, CourseId::parse)?;
    let group_id = path_id(&group_id, GroupId::parse)?;

    if !state
        .catalog_service
        .delete_group(&course_id, &group_id)
        .await?
    {
        return Err(ApiError::not_found(format!("Group '{}' not found", group_id)));
    }

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": group_id.to_string()
    })))
}
