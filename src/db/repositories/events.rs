use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::events::{ActivityItem, AuditLog, XpEvent};
use crate::db::models::user::UserId;

const XP_EVENT_FIELDS: &str = r#"
    event_id,
    user_id,
    event_type,
    xp_amount,
    description,
    metadata,
    flagged,
    flag_reason,
    flagged_by,
    created_at
"#;

pub struct XpEventRepository {
    pool: &'static Pool<Postgres>,
}

impl XpEventRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, event), fields(user_id = event.user_id.0, event_type = event.event_type))]
    pub async fn insert(&self, event: &XpEvent) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO xp_events (
                event_id,
                user_id,
                event_type,
                xp_amount,
                description,
                metadata,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&event.event_id)
        .bind(&event.user_id)
        .bind(&event.event_type)
        .bind(event.xp_amount)
        .bind(&event.description)
        .bind(&event.metadata)
        .bind(event.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn recent_for_user(&self, user_id: &UserId, limit: i64) -> SqlxResult<Vec<XpEvent>> {
        sqlx::query_as::<_, XpEvent>(&format!(
            "SELECT {XP_EVENT_FIELDS} FROM xp_events WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, reason))]
    pub async fn flag(
        &self,
        event_id: &str,
        reason: &str,
        flagged_by: &UserId,
    ) -> SqlxResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE xp_events
            SET flagged = TRUE,
                flag_reason = $2,
                flagged_by = $3
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(reason)
        .bind(flagged_by)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

pub struct ActivityRepository {
    pool: &'static Pool<Postgres>,
}

impl ActivityRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, item), fields(activity_type = item.activity_type))]
    pub async fn insert(&self, item: &ActivityItem) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_feed (
                activity_id,
                user_id,
                user_name,
                activity_type,
                description,
                metadata,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&item.activity_id)
        .bind(&item.user_id)
        .bind(&item.user_name)
        .bind(&item.activity_type)
        .bind(&item.description)
        .bind(&item.metadata)
        .bind(item.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn feed(&self, limit: i64) -> SqlxResult<Vec<ActivityItem>> {
        sqlx::query_as::<_, ActivityItem>(
            r#"
            SELECT activity_id, user_id, user_name, activity_type, description, metadata, created_at
            FROM activity_feed
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }
}

pub struct AuditRepository {
    pool: &'static Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, log), fields(action = log.action, resource_type = log.resource_type))]
    pub async fn insert(&self, log: &AuditLog) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                log_id,
                user_id,
                action,
                resource_type,
                resource_id,
                details,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&log.log_id)
        .bind(&log.user_id)
        .bind(&log.action)
        .bind(&log.resource_type)
        .bind(&log.resource_id)
        .bind(&log.details)
        .bind(log.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn recent(&self, limit: i64) -> SqlxResult<Vec<AuditLog>> {
        sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT log_id, user_id, action, resource_type, resource_id, details, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }
}
