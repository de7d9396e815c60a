/// Task model and database operations
///
/// This module provides the Task model. Tasks always belong to a team and
/// are only ever visible to members of that team; every read here is either
/// unscoped (internal) or *member-scoped* (joined against the caller's
/// memberships so non-members cannot even learn a task exists).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     assigned_to_user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE,
///     created_by_user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting the assignee's user account sets the assignment to NULL (the
/// task survives); deleting the team deletes the task.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::TeamRole;

/// Task status
///
/// The nominal flow is pending → in-progress → completed, but transitions
/// are not enforced: any of the three values may be set at any time. Values
/// outside the enum are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet (the status every task is created with)
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task model representing a task within a team
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Team this task belongs to
    pub team_id: Uuid,

    /// Assigned user (must be a member of the team; NULL when unassigned)
    pub assigned_to_user_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User who created the task (NULL if that account was deleted)
    pub created_by_user_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task annotated with the viewing user's role and display names
///
/// Row shape for member-scoped reads: the task plus `my_team_role` (the
/// caller's role in the task's team) and the assignee/creator usernames
/// joined in for display.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithContext {
    /// Task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Team this task belongs to
    pub team_id: Uuid,

    /// Assigned user
    pub assigned_to_user_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User who created the task
    pub created_by_user_id: Option<Uuid>,

    /// The viewing user's role in the task's team
    pub my_team_role: TeamRole,

    /// Username of the assignee, if any
    pub assigned_to_username: Option<String>,

    /// Username of the creator, if the account still exists
    pub created_by_username: Option<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// Status is not an input: every task starts as `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Team the task belongs to
    pub team_id: Uuid,

    /// Optional assignee (must be a member of the team)
    pub assigned_to_user_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User creating the task
    pub created_by_user_id: Uuid,
}

/// Input for updating an existing task
///
/// All fields are optional. Only non-None fields will be updated; the
/// double-Option fields distinguish "leave unchanged" (None) from "set to
/// NULL" (Some(None)) — unassigning a task is `assigned_to_user_id:
/// Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New assignee (use Some(None) to unassign)
    pub assigned_to_user_id: Option<Option<Uuid>>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,
}

/// Filters for task listings
///
/// Filters narrow the result set *within* the teams the caller belongs to;
/// they can never widen it beyond those teams.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    /// Restrict to a single team
    pub team_id: Option<Uuid>,

    /// Restrict to tasks assigned to this user
    pub assigned_to_user_id: Option<Uuid>,

    /// Restrict to tasks with this status
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Creates a new task in pending state
    ///
    /// Membership and assignee validation happen in the authorization layer
    /// before this is called; this is the raw insert.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Team or user references are invalid (foreign key violation)
    /// - Database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crewtask_shared::models::task::{Task, CreateTask};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let task = Task::create(&pool, CreateTask {
    ///     title: "Fix bug".to_string(),
    ///     description: None,
    ///     team_id,
    ///     assigned_to_user_id: None,
    ///     due_date: None,
    ///     created_by_user_id: user_id,
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, team_id, assigned_to_user_id, due_date, created_by_user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, status, team_id, assigned_to_user_id,
                      due_date, created_by_user_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.team_id)
        .bind(data.assigned_to_user_id)
        .bind(data.due_date)
        .bind(data.created_by_user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID without any membership scoping
    ///
    /// Internal/test use only; request handlers go through
    /// [`Task::find_for_member`] so that non-members get NotFound.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, team_id, assigned_to_user_id,
                   due_date, created_by_user_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to the viewing user's memberships
    ///
    /// Returns None both when the task does not exist and when it exists in
    /// a team the user is not a member of — existence is deliberately not
    /// leaked to non-members.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_for_member(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TaskWithContext>, sqlx::Error> {
        let task = sqlx::query_as::<_, TaskWithContext>(
            r#"
            SELECT tasks.id, tasks.title, tasks.description, tasks.status, tasks.team_id,
                   tasks.assigned_to_user_id, tasks.due_date, tasks.created_by_user_id,
                   team_memberships.role AS my_team_role,
                   assignees.username AS assigned_to_username,
                   creators.username AS created_by_username,
                   tasks.created_at, tasks.updated_at
            FROM tasks
            JOIN team_memberships ON tasks.team_id = team_memberships.team_id
            LEFT JOIN users AS assignees ON tasks.assigned_to_user_id = assignees.id
            LEFT JOIN users AS creators ON tasks.created_by_user_id = creators.id
            WHERE tasks.id = $1 AND team_memberships.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks visible to a user, optionally filtered
    ///
    /// The result set is restricted to tasks whose team the user is a
    /// member of, regardless of the filters supplied.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crewtask_shared::models::task::{Task, TaskFilter, TaskStatus};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let pending = Task::list_for_member(&pool, user_id, TaskFilter {
    ///     status: Some(TaskStatus::Pending),
    ///     ..Default::default()
    /// }).await?;
    /// println!("{} pending tasks", pending.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: Uuid,
        filter: TaskFilter,
    ) -> Result<Vec<TaskWithContext>, sqlx::Error> {
        // Build dynamic WHERE clauses based on which filters are present
        let mut query = String::from(
            r#"
            SELECT tasks.id, tasks.title, tasks.description, tasks.status, tasks.team_id,
                   tasks.assigned_to_user_id, tasks.due_date, tasks.created_by_user_id,
                   team_memberships.role AS my_team_role,
                   assignees.username AS assigned_to_username,
                   creators.username AS created_by_username,
                   tasks.created_at, tasks.updated_at
            FROM tasks
            JOIN team_memberships ON tasks.team_id = team_memberships.team_id
            LEFT JOIN users AS assignees ON tasks.assigned_to_user_id = assignees.id
            LEFT JOIN users AS creators ON tasks.created_by_user_id = creators.id
            WHERE team_memberships.user_id = $1
            "#,
        );
        let mut bind_count = 1;

        if filter.team_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND tasks.team_id = ${}", bind_count));
        }
        if filter.assigned_to_user_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND tasks.assigned_to_user_id = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND tasks.status = ${}", bind_count));
        }

        query.push_str(" ORDER BY tasks.created_at DESC");

        let mut q = sqlx::query_as::<_, TaskWithContext>(&query).bind(user_id);

        if let Some(team_id) = filter.team_id {
            q = q.bind(team_id);
        }
        if let Some(assigned_to) = filter.assigned_to_user_id {
            q = q.bind(assigned_to);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Updates an existing task
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.assigned_to_user_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to_user_id = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, status, team_id, \
             assigned_to_user_id, due_date, created_by_user_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(assigned_to) = data.assigned_to_user_id {
            q = q.bind(assigned_to);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks in a team
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_task_status_serde() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"completed\"").unwrap(),
            TaskStatus::Completed
        );
        // Anything outside the enum is rejected at the boundary
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_update_task_default() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.status.is_none());
        assert!(update.assigned_to_user_id.is_none());
        assert!(update.due_date.is_none());
    }

    #[test]
    fn test_task_filter_default_is_unfiltered() {
        let filter = TaskFilter::default();
        assert!(filter.team_id.is_none());
        assert!(filter.assigned_to_user_id.is_none());
        assert!(filter.status.is_none());
    }

    // Integration tests for database operations are in crewtask-api/tests/
}
