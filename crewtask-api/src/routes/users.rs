/// User directory endpoint
///
/// # Endpoints
///
/// - `GET /users` - List all registered users (public fields only)
///
/// Clients use this to pick assignees and new team members. Only id,
/// username, and email are exposed; any authenticated user may call it.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use crewtask_shared::models::user::{PublicUser, User};

/// Lists all registered users with their public fields
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list_public(&state.db).await?;
    Ok(Json(users))
}
