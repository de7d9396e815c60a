/// Membership model and database operations
///
/// This module provides the Membership model for user-team relationships
/// with role-based access control. It implements a many-to-many relationship
/// between users and teams.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE team_role AS ENUM ('admin', 'member');
///
/// CREATE TABLE team_memberships (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role team_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```
///
/// The composite primary key is what enforces the one-membership-per-pair
/// invariant, including under concurrent insert attempts.
///
/// # Roles
///
/// - **admin**: manage the team and its members, delete any task
/// - **member**: participate, create and edit tasks
///
/// Role *decisions* (who may do what) live in
/// [`crate::auth::authorization`]; this module only stores and fetches
/// membership rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles a user can hold within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full management rights over the team and its members
    Admin,

    /// Participation rights only
    Member,
}

impl TeamRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
        }
    }

    /// Whether this role may manage members (add/remove)
    pub fn can_manage_members(&self) -> bool {
        matches!(self, TeamRole::Admin)
    }
}

/// Membership model representing a user-team relationship with role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the team
    pub role: TeamRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// A team member joined with their public user fields
///
/// Row shape for member listings: membership role plus the user's id,
/// username, and email.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberWithUser {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Role within the team
    pub role: TeamRole,
}

impl Membership {
    /// Creates a new membership (adds a user to a team)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The membership already exists (primary key violation)
    /// - Team or user doesn't exist (foreign key violation)
    /// - Database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crewtask_shared::models::membership::{Membership, TeamRole};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let membership = Membership::create(&pool, team_id, user_id, TeamRole::Member).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO team_memberships (team_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING team_id, user_id, role, created_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds a specific membership by team and user
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT team_id, user_id, role, created_at
            FROM team_memberships
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks if a user is a member of a team (any role)
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn is_member(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM team_memberships
                WHERE team_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a team
    ///
    /// Always queried fresh from the membership table; roles are never
    /// cached across requests.
    ///
    /// Accepts any executor so callers holding a transaction can read the
    /// role inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn get_role(
        executor: impl sqlx::PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamRole>, sqlx::Error> {
        let role: Option<TeamRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM team_memberships
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(role)
    }

    /// Updates a user's role in a team
    ///
    /// # Returns
    ///
    /// The updated membership if found, None if the membership doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn update_role(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE team_memberships
            SET role = $3
            WHERE team_id = $1 AND user_id = $2
            RETURNING team_id, user_id, role, created_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Deletes a membership (removes a user from a team)
    ///
    /// This is the raw row deletion; the guarded removal rules (admin-only,
    /// creator and last-admin protection) are in
    /// [`crate::auth::authorization::remove_member`].
    ///
    /// # Returns
    ///
    /// True if a membership was deleted, false if it didn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(
        executor: impl sqlx::PgExecutor<'_>,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM team_memberships WHERE team_id = $1 AND user_id = $2")
                .bind(team_id)
                .bind(user_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a team with their public user fields
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_members(
        pool: &PgPool,
        team_id: Uuid,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, MemberWithUser>(
            r#"
            SELECT users.id, users.username, users.email, team_memberships.role
            FROM team_memberships
            JOIN users ON team_memberships.user_id = users.id
            WHERE team_memberships.team_id = $1
            ORDER BY team_memberships.created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists the user ids of a team's admins
    ///
    /// Accepts any executor so the removal guard can read the admin set
    /// inside its transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn admin_user_ids(
        executor: impl sqlx::PgExecutor<'_>,
        team_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM team_memberships
            WHERE team_id = $1 AND role = $2
            "#,
        )
        .bind(team_id)
        .bind(TeamRole::Admin)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    /// Counts members in a team
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM team_memberships WHERE team_id = $1")
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
    fn test_team_role_as_str() {
        assert_eq!(TeamRole::Admin.as_str(), "admin");
        assert_eq!(TeamRole::Member.as_str(), "member");
    }

    #[test]
    fn test_role_permissions() {
        assert!(TeamRole::Admin.can_manage_members());
        assert!(!TeamRole::Member.can_manage_members());
    }

    #[test]
    fn test_team_role_serde() {
        assert_eq!(serde_json::to_string(&TeamRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<TeamRole>("\"member\"").unwrap(),
            TeamRole::Member
        );
        assert!(serde_json::from_str::<TeamRole>("\"owner\"").is_err());
    }

    // Integration tests for database operations are in crewtask-api/tests/
}
