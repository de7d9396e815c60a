/// Team endpoints: CRUD and membership management
///
/// # Endpoints
///
/// - `GET    /teams` - Teams the caller belongs to, with their role
/// - `POST   /teams` - Create a team; the creator becomes its admin
/// - `GET    /teams/:id` - A single team (members only)
/// - `PUT    /teams/:id` - Update (creator or admin)
/// - `DELETE /teams/:id` - Delete, cascading to memberships and tasks
/// - `GET    /teams/:id/members` - Member list (members only)
/// - `POST   /teams/:id/members` - Add a member by username (admins only)
/// - `DELETE /teams/:id/members/:member_id` - Remove a member (admins only,
///   subject to the creator/last-admin self-removal guards)
///
/// All authorization decisions are delegated to the membership authority in
/// `crewtask_shared::auth::authorization`; no role is inspected here.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use crewtask_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        membership::{Membership, MemberWithUser, TeamRole},
        team::{CreateTeam, Team, TeamWithRole, UpdateTeam},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name (globally unique)
    #[validate(length(min = 1, max = 255, message = "Team name is required"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Update team request
///
/// Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New team name
    #[validate(length(min = 1, max = 255, message = "Team name cannot be empty"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Add member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Username of the user to add
    #[validate(length(min = 1, message = "Member username is required"))]
    pub username: String,

    /// Role to grant (defaults to member)
    pub role: Option<TeamRole>,
}

/// A team with the viewing user's role attached
#[derive(Debug, Serialize)]
pub struct TeamDetail {
    /// The team itself
    #[serde(flatten)]
    pub team: Team,

    /// The caller's role in this team
    pub my_role: TeamRole,
}

/// Creates a new team
///
/// The creating user becomes the team's first member with the `admin` role,
/// in the same transaction as the team row.
///
/// # Errors
///
/// - `409 Conflict`: Team name already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    req.validate()?;

    let team = Team::create_with_admin(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    tracing::info!(team_id = %team.id, created_by = %auth.user_id, "Team created");

    Ok((StatusCode::CREATED, Json(team)))
}

/// Lists the teams the caller belongs to
///
/// Each team is annotated with `my_role` and the creator's username.
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TeamWithRole>>> {
    let teams = Team::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(teams))
}

/// Gets a single team
///
/// # Errors
///
/// - `404 Not Found`: No such team
/// - `403 Forbidden`: Caller is not a member
pub async fn get_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<TeamDetail>> {
    let team = Team::find_by_id(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    let my_role = authorization::require_membership(&state.db, team_id, auth.user_id).await?;

    Ok(Json(TeamDetail { team, my_role }))
}

/// Updates a team
///
/// Allowed for a current admin OR the original creator (two-path rule).
///
/// # Errors
///
/// - `404 Not Found`: No such team
/// - `403 Forbidden`: Caller is neither admin nor creator
/// - `409 Conflict`: New name already taken
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<Team>> {
    req.validate()?;

    let team = Team::find_by_id(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    authorization::require_team_manage(&state.db, &team, auth.user_id).await?;

    let updated = Team::update(
        &state.db,
        team_id,
        UpdateTeam {
            name: req.name,
            description: req.description.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a team
///
/// Allowed for a current admin OR the original creator. Cascades to the
/// team's memberships and tasks.
///
/// # Errors
///
/// - `404 Not Found`: No such team
/// - `403 Forbidden`: Caller is neither admin nor creator
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let team = Team::find_by_id(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    authorization::require_team_manage(&state.db, &team, auth.user_id).await?;

    let deleted = Team::delete(&state.db, team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    tracing::info!(team_id = %team_id, deleted_by = %auth.user_id, "Team deleted");

    Ok(Json(MessageResponse::new("Team deleted successfully")))
}

/// Lists a team's members
///
/// # Errors
///
/// - `404 Not Found`: No such team
/// - `403 Forbidden`: Caller is not a member
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberWithUser>>> {
    if Team::find_by_id(&state.db, team_id).await?.is_none() {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    authorization::require_membership(&state.db, team_id, auth.user_id).await?;

    let members = Membership::list_members(&state.db, team_id).await?;
    Ok(Json(members))
}

/// Adds a member to a team
///
/// Admin-only. The target user is identified by username.
///
/// # Errors
///
/// - `404 Not Found`: No such team, or no user with that username
/// - `403 Forbidden`: Caller is not an admin of the team
/// - `409 Conflict`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    req.validate()?;

    if Team::find_by_id(&state.db, team_id).await?.is_none() {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    let target = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("User with provided username not found".to_string())
        })?;

    let membership = authorization::add_member(
        &state.db,
        team_id,
        auth.user_id,
        target.id,
        req.role.unwrap_or(TeamRole::Member),
    )
    .await?;

    tracing::info!(
        team_id = %team_id,
        user_id = %target.id,
        added_by = %auth.user_id,
        "Team member added"
    );

    Ok((StatusCode::CREATED, Json(membership)))
}

/// Removes a member from a team
///
/// Admin-only, with two self-removal guards enforced by the membership
/// authority: the team creator cannot remove themselves, and the last
/// remaining admin cannot remove themselves.
///
/// # Errors
///
/// - `404 Not Found`: No such team or membership
/// - `403 Forbidden`: Caller is not an admin, or a self-removal guard tripped
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let removed =
        authorization::remove_member(&state.db, team_id, auth.user_id, member_id).await?;

    if !removed {
        return Err(ApiError::NotFound(
            "Team member not found or already removed".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("Team member removed successfully")))
}
