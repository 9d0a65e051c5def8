use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult};
use crate::db::models::badge::{BadgeWithEarned, EarnedBadge};
use crate::db::models::events::XpEvent;
use crate::db::prelude::{BadgeRepository, UserBadgeRepository, XpEventRepository};
use crate::gamification::xp;

const RECENT_EVENTS: i64 = 20;

#[derive(Debug, Serialize)]
pub struct GamificationStats {
    pub level: i32,
    pub xp: i64,
    pub xp_for_next_level: i64,
    pub progress_percent: f64,
    pub streak_days: i32,
    pub recent_events: Vec<XpEvent>,
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn stats(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<GamificationStats> {
    let recent_events = XpEventRepository::new(state.db_pool)
        .recent_for_user(&user.user_id, RECENT_EVENTS)
        .await?;

    Ok(Json(GamificationStats {
        level: user.level,
        xp: user.xp,
        xp_for_next_level: xp::level_cost(user.level),
        progress_percent: (user.xp % 1000) as f64 / 10.0,
        streak_days: user.streak_days,
        recent_events,
    }))
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn all_badges(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<Vec<BadgeWithEarned>> {
    let badge_repo = BadgeRepository::new(state.db_pool);
    let user_badge_repo = UserBadgeRepository::new(state.db_pool);
    let (badges, earned) = futures::try_join!(
        badge_repo.all(),
        user_badge_repo.for_user(&user.user_id),
    )?;

    let earned_ids: HashSet<&str> = earned.iter().map(|b| b.badge_id.as_str()).collect();

    let badges = badges
        .into_iter()
        .map(|badge| BadgeWithEarned {
            earned: earned_ids.contains(badge.badge_id.as_str()),
            badge,
        })
        .collect();

    Ok(Json(badges))
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn user_badges(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<Vec<EarnedBadge>> {
    let earned = UserBadgeRepository::new(state.db_pool)
        .for_user(&user.user_id)
        .await?;

    let badge_ids: Vec<String> = earned.iter().map(|b| b.badge_id.clone()).collect();
    let badges = BadgeRepository::new(state.db_pool).by_ids(&badge_ids).await?;

    let earned_at: HashMap<&str, DateTime<Utc>> = earned
        .iter()
        .map(|b| (b.badge_id.as_str(), b.earned_at))
        .collect();

    let badges = badges
        .into_iter()
        .map(|badge| EarnedBadge {
            earned_at: earned_at.get(badge.badge_id.as_str()).copied(),
            badge,
        })
        .collect();

    Ok(Json(badges))
}
