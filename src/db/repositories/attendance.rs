use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::attendance::Attendance;
use crate::db::models::user::UserId;
use crate::db::repositories::sql_fragment::ATTENDANCE_FIELDS;

pub struct AttendanceRepository {
    pool: &'static Pool<Postgres>,
}

impl AttendanceRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_active(&self, user_id: &UserId) -> SqlxResult<Option<Attendance>> {
        sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_FIELDS} FROM attendance WHERE user_id = $1 AND check_out IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
    }

    /// The partial unique index on (user_id) WHERE check_out IS NULL makes a
    /// concurrent double check-in surface here as a unique violation.
    #[instrument(skip(self, record), fields(user_id = record.user_id.0))]
    pub async fn insert(&self, record: &Attendance) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance (
                attendance_id,
                user_id,
                session_id,
                check_in,
                check_out,
                duration_minutes,
                xp_earned
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.attendance_id)
        .bind(&record.user_id)
        .bind(&record.session_id)
        .bind(record.check_in)
        .bind(record.check_out)
        .bind(record.duration_minutes)
        .bind(record.xp_earned)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Closes the record once; a record already closed is left untouched.
    #[instrument(skip(self))]
    pub async fn close(
        &self,
        attendance_id: &str,
        check_out: DateTime<Utc>,
        duration_minutes: i32,
        xp_earned: i64,
    ) -> SqlxResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = $2,
                duration_minutes = $3,
                xp_earned = $4
            WHERE attendance_id = $1 AND check_out IS NULL
            "#,
        )
        .bind(attendance_id)
        .bind(check_out)
        .bind(duration_minutes)
        .bind(xp_earned)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    pub async fn history(&self, user_id: &UserId, limit: i64) -> SqlxResult<Vec<Attendance>> {
        sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_FIELDS} FROM attendance WHERE user_id = $1 ORDER BY check_in DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> SqlxResult<Vec<Attendance>> {
        sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_FIELDS} FROM attendance WHERE user_id = $1 AND check_in >= $2"
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn count_for_user(&self, user_id: &UserId) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
    }
}
