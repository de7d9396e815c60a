/// Task endpoints: CRUD within a team
///
/// # Endpoints
///
/// - `GET    /tasks` - Tasks from the caller's teams, optionally filtered
/// - `POST   /tasks` - Create a task in a team (members only)
/// - `GET    /tasks/:id` - A single task (404 for non-members of its team)
/// - `PUT    /tasks/:id` - Update (any member of the task's team)
/// - `DELETE /tasks/:id` - Delete (task creator or team admin only)
///
/// Reads are member-scoped: a task in a foreign team is indistinguishable
/// from a task that doesn't exist. Assignment is validated so the assignee
/// is always a current member of the task's team.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use crewtask_shared::{
    auth::{authorization, middleware::AuthContext},
    models::task::{CreateTask, Task, TaskFilter, TaskStatus, TaskWithContext, UpdateTask},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Task title is required"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Team the task belongs to
    pub team_id: Uuid,

    /// Optional assignee (must be a member of the team)
    pub assigned_to_user_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// Absent fields are left unchanged; `assigned_to_user_id` and `due_date`
/// accept an explicit `null` to clear the value (unassign / remove due
/// date).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Task title cannot be empty"))]
    pub title: Option<String>,

    /// New description (null clears)
    #[serde(default)]
    pub description: Option<Option<String>>,

    /// New status (one of pending, in-progress, completed)
    pub status: Option<TaskStatus>,

    /// New assignee (null unassigns)
    #[serde(default)]
    pub assigned_to_user_id: Option<Option<Uuid>>,

    /// New due date (null clears)
    #[serde(default)]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Query parameters for task listings
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Restrict to a single team
    pub team_id: Option<Uuid>,

    /// Restrict to tasks assigned to this user
    pub assigned_to_user_id: Option<Uuid>,

    /// Restrict to tasks with this status
    pub status: Option<TaskStatus>,
}

/// Creates a new task within a team
///
/// The caller must be a member of the team; an assignee, if given, must be
/// a member too. Every task starts in `pending` status.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the team
/// - `422 Unprocessable Entity`: Validation failed, or the assignee is not
///   a member of the team
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    authorization::require_membership(&state.db, req.team_id, auth.user_id).await?;

    if let Some(assignee) = req.assigned_to_user_id {
        authorization::require_assignable(&state.db, req.team_id, assignee).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            team_id: req.team_id,
            assigned_to_user_id: req.assigned_to_user_id,
            due_date: req.due_date,
            created_by_user_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, team_id = %task.team_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists tasks visible to the caller
///
/// The result set is restricted to tasks whose team the caller is a member
/// of; the optional filters narrow within that set and can never widen it.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskWithContext>>> {
    let tasks = Task::list_for_member(
        &state.db,
        auth.user_id,
        TaskFilter {
            team_id: query.team_id,
            assigned_to_user_id: query.assigned_to_user_id,
            status: query.status,
        },
    )
    .await?;

    Ok(Json(tasks))
}

/// Gets a single task
///
/// # Errors
///
/// - `404 Not Found`: No such task, or the caller is not a member of its
///   team (existence is not leaked to non-members)
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskWithContext>> {
    let task = Task::find_for_member(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Task not found or you do not have access".to_string())
        })?;

    Ok(Json(task))
}

/// Updates a task
///
/// Any current member of the task's team may edit it — a looser rule than
/// deletion. Reassignment validates the new assignee's membership. Status
/// may move between the three values in any order.
///
/// # Errors
///
/// - `404 Not Found`: No such task, or the caller is not a member of its team
/// - `403 Forbidden`: Caller may not edit this task
/// - `422 Unprocessable Entity`: New assignee is not a member of the team
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::find_for_member(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "Task not found or you do not have permission to update it".to_string(),
            )
        })?;

    if !authorization::can_update_task(task.my_team_role, task.created_by_user_id, auth.user_id) {
        return Err(ApiError::Forbidden(
            "You do not have permission to update this task".to_string(),
        ));
    }

    if let Some(Some(assignee)) = req.assigned_to_user_id {
        authorization::require_assignable(&state.db, task.team_id, assignee).await?;
    }

    let updated = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            assigned_to_user_id: req.assigned_to_user_id,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a task
///
/// Only the task's creator or a team admin may delete — stricter than
/// update; ordinary members cannot delete other people's tasks.
///
/// # Errors
///
/// - `404 Not Found`: No such task, or the caller is not a member of its team
/// - `403 Forbidden`: Caller is neither the creator nor a team admin
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let task = Task::find_for_member(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "Task not found or you do not have permission to delete it".to_string(),
            )
        })?;

    if !authorization::can_delete_task(task.my_team_role, task.created_by_user_id, auth.user_id) {
        return Err(ApiError::Forbidden(
            "Only the task creator or a team admin can delete this task".to_string(),
        ));
    }

    let deleted = Task::delete(&state.db, task_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %task_id, deleted_by = %auth.user_id, "Task deleted");

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
