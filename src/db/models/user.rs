use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct UserId(pub String);

/// Base users table model. `xp` is the remainder above the banked level
/// thresholds, never lifetime total; `level` is derived from it by the
/// gamification engine and starts at 1.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub roles: Vec<String>,
    pub level: i32,
    pub xp: i64,
    pub streak_days: i32,
    pub last_active: Option<DateTime<Utc>>,
    pub onboarding_completed: bool,
    pub goals: Vec<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Minimal projection used when enriching feeds, matches and leaderboards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub user_id: UserId,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Music,
    Gaming,
    Instrument,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Music => "music",
            UserRole::Gaming => "gaming",
            UserRole::Instrument => "instrument",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub roles: Option<Vec<UserRole>>,
    pub goals: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub name: String,
    pub roles: Vec<UserRole>,
    pub goals: Vec<String>,
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
