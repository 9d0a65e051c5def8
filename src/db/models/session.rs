use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::user::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSession {
    pub session_token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudioSession {
    pub session_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i32,
    pub session_type: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StudioSessionCreate {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_max_participants")]
    pub max_participants: i32,
    pub session_type: String,
}

#[inline]
const fn default_max_participants() -> i32 {
    10
}
