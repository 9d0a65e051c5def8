//! Append-only activity/audit recording. Both sinks are best-effort
//! observability: a failed insert is logged and swallowed so it can never
//! fail the operation that triggered it.

use chrono::Utc;
use serde_json::Value;
use sqlx::{Pool, Postgres};
use tracing::instrument;

use crate::db::models::events::{ActivityItem, AuditLog};
use crate::db::models::user::UserId;
use crate::db::prelude::{ActivityRepository, AuditRepository};
use crate::util::prefixed_id;

pub struct Recorder {
    pool: &'static Pool<Postgres>,
}

impl Recorder {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, description, metadata))]
    pub async fn activity(
        &self,
        user_id: &UserId,
        user_name: &str,
        activity_type: &str,
        description: String,
        metadata: Value,
    ) {
        let item = ActivityItem {
            activity_id: prefixed_id("activity"),
            user_id: user_id.clone(),
            user_name: user_name.to_string(),
            activity_type: activity_type.to_string(),
            description,
            metadata,
            created_at: Utc::now(),
        };

        if let Err(e) = ActivityRepository::new(self.pool).insert(&item).await {
            tracing::warn!(error = ?e, activity_type, "activity feed entry dropped");
        }
    }

    #[instrument(skip(self, details))]
    pub async fn audit(
        &self,
        user_id: &UserId,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        details: Value,
    ) {
        let log = AuditLog {
            log_id: prefixed_id("log"),
            user_id: user_id.clone(),
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details,
            created_at: Utc::now(),
        };

        if let Err(e) = AuditRepository::new(self.pool).insert(&log).await {
            tracing::warn!(error = ?e, action, "audit log entry dropped");
        }
    }
}
