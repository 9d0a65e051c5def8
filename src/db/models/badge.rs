use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::user::UserId;

/// Static catalog entry. Seeded once, read-only afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Badge {
    pub badge_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub requirement_type: String,
    pub requirement_value: i64,
    pub xp_reward: i64,
    pub rarity: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserBadge {
    pub user_badge_id: String,
    pub user_id: UserId,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BadgeWithEarned {
    #[serde(flatten)]
    pub badge: Badge,
    pub earned: bool,
}

#[derive(Debug, Serialize)]
pub struct EarnedBadge {
    #[serde(flatten)]
    pub badge: Badge,
    pub earned_at: Option<DateTime<Utc>>,
}
