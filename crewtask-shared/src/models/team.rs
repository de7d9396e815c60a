/// Team model and database operations
///
/// This module provides the Team model. Every user belongs to zero or more
/// teams via the Membership model; tasks are always scoped to a team.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL UNIQUE,
///     description TEXT,
///     created_by_user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Team names are globally unique; the constraint violation surfaces to
/// callers as a conflict. Deleting a team cascades to its memberships and
/// tasks at the schema level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::TeamRole;

/// Team model representing a team of users
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID (UUID v4)
    pub id: Uuid,

    /// Team name (globally unique)
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// User who created the team
    ///
    /// The creator retains manage rights even if later demoted from admin.
    pub created_by_user_id: Uuid,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// A team annotated with the viewing user's role and the creator's name
///
/// Row shape for team listings: every team the user belongs to, with
/// `my_role` from their membership and the creator's username joined in.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamWithRole {
    /// Team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// User who created the team
    pub created_by_user_id: Uuid,

    /// The viewing user's role in this team
    pub my_role: TeamRole,

    /// Username of the creator (None if the join finds no user)
    pub created_by_username: Option<String>,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name (must be unique)
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Input for updating an existing team
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    /// New team name
    pub name: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,
}

impl Team {
    /// Creates a team together with its first membership
    ///
    /// The creating user is inserted as an `admin` member in the same
    /// transaction as the team row: both succeed or both fail, so a team
    /// can never exist without an admin.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The team name already exists (unique constraint violation)
    /// - Database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crewtask_shared::models::team::{Team, CreateTeam};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, creator: Uuid) -> Result<(), sqlx::Error> {
    /// let team = Team::create_with_admin(&pool, CreateTeam {
    ///     name: "Engineering".to_string(),
    ///     description: None,
    /// }, creator).await?;
    /// println!("Created team: {}", team.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_with_admin(
        pool: &PgPool,
        data: CreateTeam,
        creator_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, created_by_user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by_user_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(creator_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO team_memberships (team_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(team.id)
        .bind(creator_id)
        .bind(TeamRole::Admin)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(team)
    }

    /// Finds a team by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by_user_id, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Finds a team by name (exact match)
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by_user_id, created_at, updated_at
            FROM teams
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists the teams a user belongs to, annotated with their role
    ///
    /// Only teams where the user holds a membership are returned; each row
    /// carries `my_role` and the creator's username.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use crewtask_shared::models::team::Team;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let teams = Team::list_for_user(&pool, user_id).await?;
    /// println!("User belongs to {} teams", teams.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TeamWithRole>, sqlx::Error> {
        let teams = sqlx::query_as::<_, TeamWithRole>(
            r#"
            SELECT teams.id, teams.name, teams.description, teams.created_by_user_id,
                   team_memberships.role AS my_role,
                   creators.username AS created_by_username,
                   teams.created_at, teams.updated_at
            FROM teams
            JOIN team_memberships ON teams.id = team_memberships.team_id
            LEFT JOIN users AS creators ON teams.created_by_user_id = creators.id
            WHERE team_memberships.user_id = $1
            ORDER BY teams.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Updates an existing team
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// # Returns
    ///
    /// The updated team if found, None if the team doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The new name already exists for another team
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE teams SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, created_by_user_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Team>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let team = q.fetch_optional(pool).await?;

        Ok(team)
    }

    /// Deletes a team by ID
    ///
    /// Cascades to all memberships and tasks of the team.
    ///
    /// # Returns
    ///
    /// True if the team was deleted, false if it didn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_team_default() {
        let update = UpdateTeam::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_create_team_optional_description() {
        let create = CreateTeam {
            name: "Engineering".to_string(),
            description: None,
        };
        assert_eq!(create.name, "Engineering");
        assert!(create.description.is_none());
    }

    // Integration tests for database operations are in crewtask-api/tests/
}
