use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::db::models::user::UserId;

/// Immutable XP ledger row. Never updated except for the admin flag fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct XpEvent {
    pub event_id: String,
    pub user_id: UserId,
    pub event_type: String,
    pub xp_amount: i64,
    pub description: String,
    pub metadata: Value,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub flagged_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityItem {
    pub activity_id: String,
    pub user_id: UserId,
    pub user_name: String,
    pub activity_type: String,
    pub description: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditLog {
    pub log_id: String,
    pub user_id: UserId,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}
