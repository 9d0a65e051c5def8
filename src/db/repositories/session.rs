use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::session::{StudioSession, UserSession};
use crate::db::models::user::UserId;

pub struct SessionRepository {
    pool: &'static Pool<Postgres>,
}

impl SessionRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, session), fields(user_id = session.user_id.0))]
    pub async fn insert(&self, session: &UserSession) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (session_token, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.session_token)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    pub async fn find_by_token(&self, token: &str) -> SqlxResult<Option<UserSession>> {
        sqlx::query_as::<_, UserSession>(
            r#"
            SELECT session_token, user_id, expires_at, created_at
            FROM user_sessions
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_by_token(&self, token: &str) -> SqlxResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE session_token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Logging in replaces any prior sessions for the user.
    #[instrument(skip(self))]
    pub async fn delete_for_user(&self, user_id: &UserId) -> SqlxResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

pub struct StudioSessionRepository {
    pool: &'static Pool<Postgres>,
}

impl StudioSessionRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, session), fields(session_id = session.session_id))]
    pub async fn insert(&self, session: &StudioSession) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO studio_sessions (
                session_id,
                title,
                description,
                start_time,
                end_time,
                max_participants,
                session_type,
                created_by,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.max_participants)
        .bind(&session.session_type)
        .bind(&session.created_by)
        .bind(session.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        upcoming_after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> SqlxResult<Vec<StudioSession>> {
        const FIELDS: &str = r#"
            session_id,
            title,
            description,
            start_time,
            end_time,
            max_participants,
            session_type,
            created_by,
            created_at
        "#;

        match upcoming_after {
            Some(after) => {
                sqlx::query_as::<_, StudioSession>(&format!(
                    "SELECT {FIELDS} FROM studio_sessions WHERE start_time >= $1 ORDER BY start_time ASC LIMIT $2"
                ))
                .bind(after)
                .bind(limit)
                .fetch_all(self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, StudioSession>(&format!(
                    "SELECT {FIELDS} FROM studio_sessions ORDER BY start_time ASC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(self.pool)
                .await
            }
        }
    }
}
