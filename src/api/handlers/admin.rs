use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::models::events::AuditLog;
use crate::db::models::season::Season;
use crate::db::models::user::User;
use crate::db::prelude::{
    AuditRepository, BadgeRepository, SeasonRepository, UserRepository, XpEventRepository,
};
use crate::gamification::badges;
use crate::recorder::Recorder;

const USER_LISTING_CAP: i64 = 1000;

#[inline]
const fn default_audit_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn require_admin(user: &User) -> Result<(), RouteError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(RouteError::Forbidden("admin access required"))
    }
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn audit_logs(
    Query(param): Query<AuditQuery>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<Vec<AuditLog>> {
    require_admin(&user)?;

    let logs = AuditRepository::new(state.db_pool)
        .recent(param.limit)
        .await?;

    Ok(Json(logs))
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn all_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<Vec<User>> {
    require_admin(&user)?;

    let users = UserRepository::new(state.db_pool)
        .list_all(USER_LISTING_CAP)
        .await?;

    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct FlagEventRequest {
    pub event_id: String,
    pub reason: String,
}

/// Marks a ledger event for review; the event itself stays immutable
/// otherwise.
#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn flag_event(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<FlagEventRequest>,
) -> JsonResult<Value> {
    require_admin(&user)?;

    let flagged = XpEventRepository::new(state.db_pool)
        .flag(&data.event_id, &data.reason, &user.user_id)
        .await?;
    if !flagged {
        return Err(RouteError::NotFound("event"));
    }

    Recorder::new(state.db_pool)
        .audit(
            &user.user_id,
            "flag_event",
            "gamification_event",
            &data.event_id,
            json!({"reason": data.reason}),
        )
        .await;

    Ok(Json(json!({"success": true})))
}

/// Seeds the badge catalog and the current season. Idempotent.
#[instrument(skip(state))]
pub async fn seed(State(state): State<Arc<AppState>>) -> JsonResult<Value> {
    let badge_repo = BadgeRepository::new(state.db_pool);
    let catalog = badges::catalog();
    for badge in &catalog {
        badge_repo.upsert(badge).await?;
    }

    let season = Season {
        season_id: String::from("season_2025_summer"),
        name: String::from("Summer 2025"),
        start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).unwrap(),
        is_active: true,
        rewards: json!([
            {"rank": 1, "title": "Gold", "reward": "Exclusive Gold Badge + 5000 XP"},
            {"rank": 2, "title": "Silver", "reward": "Silver Badge + 3000 XP"},
            {"rank": 3, "title": "Bronze", "reward": "Bronze Badge + 1500 XP"},
            {"rank": 10, "title": "Top 10", "reward": "Elite Badge + 500 XP"},
        ]),
    };
    SeasonRepository::new(state.db_pool).upsert(&season).await?;

    Ok(Json(json!({
        "message": "Seed data created successfully",
        "badges_count": catalog.len(),
    })))
}
