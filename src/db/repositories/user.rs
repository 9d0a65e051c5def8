use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::user::{User, UserId, UserSummary};
use crate::db::repositories::sql_fragment::USER_FIELDS;

pub struct UserRepository {
    pool: &'static Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &UserId) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_FIELDS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_FIELDS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(self.pool)
            .await
    }

    #[instrument(skip(self, user), fields(user_id = user.user_id.0))]
    pub async fn insert(&self, user: &User) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                name,
                picture,
                roles,
                level,
                xp,
                streak_days,
                last_active,
                onboarding_completed,
                goals,
                is_admin,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.picture)
        .bind(&user.roles)
        .bind(user.level)
        .bind(user.xp)
        .bind(user.streak_days)
        .bind(user.last_active)
        .bind(user.onboarding_completed)
        .bind(&user.goals)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Refresh name/picture from the identity provider on login. Streak
    /// state (`last_active`) is owned by the gamification engine and is
    /// deliberately not touched here.
    #[instrument(skip(self, name, picture))]
    pub async fn update_identity(
        &self,
        id: &UserId,
        name: &str,
        picture: Option<&str>,
    ) -> SqlxResult<()> {
        sqlx::query("UPDATE users SET name = $2, picture = $3 WHERE user_id = $1")
            .bind(id)
            .bind(name)
            .bind(picture)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, name, roles, goals))]
    pub async fn update_profile(
        &self,
        id: &UserId,
        name: Option<String>,
        roles: Option<Vec<String>>,
        goals: Option<Vec<String>>,
    ) -> SqlxResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                roles = COALESCE($3, roles),
                goals = COALESCE($4, goals)
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(roles)
        .bind(goals)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, name, roles, goals))]
    pub async fn complete_onboarding(
        &self,
        id: &UserId,
        name: &str,
        roles: &[String],
        goals: &[String],
    ) -> SqlxResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
                roles = $3,
                goals = $4,
                onboarding_completed = TRUE
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(roles)
        .bind(goals)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self, limit: i64) -> SqlxResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_FIELDS} FROM users ORDER BY created_at ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, ids))]
    pub async fn summaries_by_ids(&self, ids: &[String]) -> SqlxResult<Vec<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT user_id, name, picture FROM users WHERE user_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await
    }
}
