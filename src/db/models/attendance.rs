use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::user::UserId;

/// One studio visit. `check_out` stays NULL while the visit is open; a
/// partial unique index keeps at most one open record per user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Attendance {
    pub attendance_id: String,
    pub user_id: UserId,
    pub session_id: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub xp_earned: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckOutSummary {
    pub attendance_id: String,
    pub duration_minutes: i32,
    pub xp_earned: i64,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct HeatmapBucket {
    pub count: i64,
    pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct AttendanceStatus {
    pub is_checked_in: bool,
    pub attendance: Option<Attendance>,
}
