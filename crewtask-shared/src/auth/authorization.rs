/// The membership authority: role checks and guarded membership mutations
///
/// Every role comparison in crewtask happens in this module. Route handlers
/// never inspect a role themselves; they ask this module, so the permission
/// rules for teams and tasks cannot drift apart.
///
/// # Permission Model
///
/// 1. **Membership**: most operations require the acting user to be a
///    member of the team in question.
/// 2. **Role**: member management requires the `admin` role.
/// 3. **Two-path team management**: updating or deleting a team is allowed
///    for a current `admin` OR the original creator — a creator retains
///    manage rights even if later demoted.
/// 4. **Task rules**: any member may edit a task; only the task's creator
///    or a team admin may delete it.
///
/// Membership removal carries two self-removal guards:
/// - the team creator cannot remove themselves from their own team;
/// - the last remaining admin cannot remove themselves (which would orphan
///   the team). Only *self*-removal is blocked; an admin removing a
///   different last admin is allowed.
///
/// Role checks are always performed fresh against the membership table —
/// roles are never cached across requests. The guarded mutations run inside
/// a transaction that locks the team row, so two concurrent removals cannot
/// both pass the guard before either commits.
///
/// # Example
///
/// ```no_run
/// use crewtask_shared::auth::authorization::{require_admin, require_membership};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Any member may read the team
/// require_membership(&pool, team_id, user_id).await?;
///
/// // Only admins may manage members
/// require_admin(&pool, team_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::{Membership, TeamRole};
use crate::models::team::Team;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the team
    #[error("You are not a member of this team")]
    NotMember(Uuid),

    /// User is a member but not an admin
    #[error("Only team admins can perform this action")]
    NotAdmin(Uuid),

    /// User is neither a team admin nor the team creator
    #[error("Only the team creator or a team admin can manage this team")]
    NotTeamManager(Uuid),

    /// Team creator attempted to remove themselves
    #[error("Team creator cannot be removed from their own team")]
    CreatorSelfRemoval,

    /// Sole remaining admin attempted to remove themselves
    #[error("Cannot remove yourself if you are the last admin of the team")]
    LastAdminSelfRemoval,

    /// Target user already holds a membership in the team
    #[error("User is already a member of this team")]
    AlreadyMember,

    /// Proposed assignee is not a member of the task's team
    #[error("Assigned user is not a member of this team")]
    AssigneeNotMember,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks that a user is a member of a team, returning their role
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if the user holds no membership
pub async fn require_membership(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<TeamRole, AuthzError> {
    Membership::get_role(pool, team_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(team_id))
}

/// Checks that a user holds the `admin` role in a team
///
/// # Errors
///
/// Returns `NotMember` for non-members, `NotAdmin` for plain members
pub async fn require_admin(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), AuthzError> {
    match require_membership(pool, team_id, user_id).await? {
        TeamRole::Admin => Ok(()),
        TeamRole::Member => Err(AuthzError::NotAdmin(team_id)),
    }
}

/// Checks the two-path team management rule: admin OR original creator
///
/// The creator path is deliberate, not redundant: a creator demoted to
/// plain member (or removed from the team entirely) still retains update
/// and delete rights over the team they created, while any other current
/// admin also qualifies.
///
/// # Errors
///
/// Returns `AuthzError::NotTeamManager` if neither path applies
pub async fn require_team_manage(
    pool: &PgPool,
    team: &Team,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if team.created_by_user_id == user_id {
        return Ok(());
    }

    match Membership::get_role(pool, team.id, user_id).await? {
        Some(TeamRole::Admin) => Ok(()),
        _ => Err(AuthzError::NotTeamManager(team.id)),
    }
}

/// Checks that a proposed assignee is a current member of a team
///
/// Used whenever a task is created with an assignee or reassigned; the
/// resulting error maps to a validation failure, not a permission one —
/// the *caller* is allowed to assign, the *target* is invalid.
///
/// # Errors
///
/// Returns `AuthzError::AssigneeNotMember` if the user is not a member
pub async fn require_assignable(
    pool: &PgPool,
    team_id: Uuid,
    assignee_id: Uuid,
) -> Result<(), AuthzError> {
    if Membership::is_member(pool, team_id, assignee_id).await? {
        Ok(())
    } else {
        Err(AuthzError::AssigneeNotMember)
    }
}

/// Adds a member to a team on behalf of an acting user
///
/// The acting user must hold the `admin` role (checked fresh). Duplicate
/// memberships are impossible even under concurrent calls: the membership
/// table's primary key rejects the second insert, which this function
/// surfaces as [`AuthzError::AlreadyMember`].
///
/// # Errors
///
/// - `NotMember` / `NotAdmin` if the acting user may not manage members
/// - `AlreadyMember` if the target already belongs to the team
/// - `Database` for any other failure
pub async fn add_member(
    pool: &PgPool,
    team_id: Uuid,
    acting_user_id: Uuid,
    target_user_id: Uuid,
    role: TeamRole,
) -> Result<Membership, AuthzError> {
    require_admin(pool, team_id, acting_user_id).await?;

    match Membership::create(pool, team_id, target_user_id, role).await {
        Ok(membership) => Ok(membership),
        Err(err) if is_unique_violation(&err) => Err(AuthzError::AlreadyMember),
        Err(err) => Err(err.into()),
    }
}

/// Removes a member from a team on behalf of an acting user
///
/// The whole check-then-delete sequence runs in one transaction holding a
/// row lock on the team, so concurrent removals against the same team
/// serialize and the admin-count guard cannot be raced past.
///
/// Rules, in order:
/// 1. acting user must be an admin of the team;
/// 2. the creator cannot remove themselves;
/// 3. the last remaining admin cannot remove themselves.
///
/// # Returns
///
/// True if a membership was removed; false if the team or the target's
/// membership does not exist (callers surface that as not-found).
///
/// # Errors
///
/// `NotMember`/`NotAdmin` for an unauthorized acting user,
/// `CreatorSelfRemoval`/`LastAdminSelfRemoval` when a guard trips
pub async fn remove_member(
    pool: &PgPool,
    team_id: Uuid,
    acting_user_id: Uuid,
    target_user_id: Uuid,
) -> Result<bool, AuthzError> {
    let mut tx = pool.begin().await?;

    // Lock the team row: membership mutations for one team serialize here
    let team = sqlx::query_as::<_, Team>(
        r#"
        SELECT id, name, description, created_by_user_id, created_at, updated_at
        FROM teams
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(team_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(team) = team else {
        return Ok(false);
    };

    match Membership::get_role(&mut *tx, team_id, acting_user_id).await? {
        Some(TeamRole::Admin) => {}
        Some(TeamRole::Member) => return Err(AuthzError::NotAdmin(team_id)),
        None => return Err(AuthzError::NotMember(team_id)),
    }

    let admin_ids = Membership::admin_user_ids(&mut *tx, team_id).await?;
    check_self_removal(&team, &admin_ids, acting_user_id, target_user_id)?;

    let removed = Membership::delete(&mut *tx, team_id, target_user_id).await?;

    tx.commit().await?;

    if removed {
        tracing::info!(
            team_id = %team_id,
            target_user_id = %target_user_id,
            acting_user_id = %acting_user_id,
            "Team member removed"
        );
    }

    Ok(removed)
}

/// The pure self-removal guards for member removal
///
/// Blocks removal when the target is the team creator removing themselves,
/// or the sole remaining admin removing themselves. Both guards compare the
/// target against the *acting* user: removing someone else is never blocked
/// here, even when it leaves the team without admins.
pub fn check_self_removal(
    team: &Team,
    admin_ids: &[Uuid],
    acting_user_id: Uuid,
    target_user_id: Uuid,
) -> Result<(), AuthzError> {
    if team.created_by_user_id == target_user_id && acting_user_id == target_user_id {
        return Err(AuthzError::CreatorSelfRemoval);
    }

    let is_last_admin = admin_ids.len() == 1 && admin_ids[0] == target_user_id;
    if is_last_admin && acting_user_id == target_user_id {
        return Err(AuthzError::LastAdminSelfRemoval);
    }

    Ok(())
}

/// Whether a user may edit a task
///
/// Any current member of the task's team may edit — the creator included.
/// The rule is deliberately looser than deletion.
pub fn can_update_task(role: TeamRole, created_by: Option<Uuid>, user_id: Uuid) -> bool {
    created_by == Some(user_id) || matches!(role, TeamRole::Admin | TeamRole::Member)
}

/// Whether a user may delete a task
///
/// Only the task's creator or a team admin; ordinary members cannot delete
/// other people's tasks.
pub fn can_delete_task(role: TeamRole, created_by: Option<Uuid>, user_id: Uuid) -> bool {
    created_by == Some(user_id) || role == TeamRole::Admin
}

/// Whether a sqlx error is a PostgreSQL unique/primary-key violation
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team_created_by(creator: Uuid) -> Team {
        Team {
            id: Uuid::new_v4(),
            name: "Engineering".to_string(),
            description: None,
            created_by_user_id: creator,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_creator_cannot_remove_themselves() {
        let creator = Uuid::new_v4();
        let team = team_created_by(creator);

        let result = check_self_removal(&team, &[creator], creator, creator);
        assert!(matches!(result, Err(AuthzError::CreatorSelfRemoval)));
    }

    #[test]
    fn test_creator_removed_by_another_admin_is_allowed() {
        let creator = Uuid::new_v4();
        let other_admin = Uuid::new_v4();
        let team = team_created_by(creator);

        // The guard only blocks *self*-removal
        let result = check_self_removal(&team, &[creator, other_admin], other_admin, creator);
        assert!(result.is_ok());
    }

    #[test]
    fn test_last_admin_cannot_remove_themselves() {
        let creator = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let team = team_created_by(creator);

        let result = check_self_removal(&team, &[admin], admin, admin);
        assert!(matches!(result, Err(AuthzError::LastAdminSelfRemoval)));
    }

    #[test]
    fn test_non_last_admin_may_remove_themselves() {
        let creator = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let other_admin = Uuid::new_v4();
        let team = team_created_by(creator);

        let result = check_self_removal(&team, &[admin, other_admin], admin, admin);
        assert!(result.is_ok());
    }

    #[test]
    fn test_admin_may_remove_a_different_last_admin() {
        // Preserved asymmetry: only self-removal of the last admin is
        // blocked, not removal of a different last admin.
        let creator = Uuid::new_v4();
        let acting = Uuid::new_v4();
        let last_admin = Uuid::new_v4();
        let team = team_created_by(creator);

        let result = check_self_removal(&team, &[last_admin], acting, last_admin);
        assert!(result.is_ok());
    }

    #[test]
    fn test_removing_plain_member_is_allowed() {
        let creator = Uuid::new_v4();
        let member = Uuid::new_v4();
        let team = team_created_by(creator);

        let result = check_self_removal(&team, &[creator], creator, member);
        assert!(result.is_ok());
    }

    #[test]
    fn test_any_member_can_update_task() {
        let creator = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        assert!(can_update_task(TeamRole::Member, Some(creator), someone_else));
        assert!(can_update_task(TeamRole::Admin, Some(creator), someone_else));
        assert!(can_update_task(TeamRole::Member, Some(creator), creator));
    }

    #[test]
    fn test_only_creator_or_admin_can_delete_task() {
        let creator = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        assert!(can_delete_task(TeamRole::Member, Some(creator), creator));
        assert!(can_delete_task(TeamRole::Admin, Some(creator), someone_else));
        assert!(!can_delete_task(TeamRole::Member, Some(creator), someone_else));
        // Creator account deleted: only admins qualify
        assert!(!can_delete_task(TeamRole::Member, None, someone_else));
        assert!(can_delete_task(TeamRole::Admin, None, someone_else));
    }

    // Integration tests for the guarded mutations are in crewtask-api/tests/
}
