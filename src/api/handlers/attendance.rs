use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::models::attendance::{
    Attendance, AttendanceStatus, CheckInRequest, CheckOutSummary, HeatmapBucket,
};
use crate::db::prelude::AttendanceRepository;
use crate::gamification::Gamification;
use crate::recorder::Recorder;
use crate::util::prefixed_id;

/// Check-out XP is 1 per minute, capped.
const MAX_SESSION_XP: i32 = 120;

const HEATMAP_DAYS: i64 = 90;

#[inline]
const fn default_history_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<CheckInRequest>,
) -> JsonResult<Attendance> {
    let repo = AttendanceRepository::new(state.db_pool);

    if repo.find_active(&user.user_id).await?.is_some() {
        return Err(RouteError::InvalidInput(String::from("already checked in")));
    }

    let record = Attendance {
        attendance_id: prefixed_id("att"),
        user_id: user.user_id.clone(),
        session_id: data.session_id,
        check_in: Utc::now(),
        check_out: None,
        duration_minutes: 0,
        xp_earned: 0,
    };

    // a concurrent check-in that slipped past the find_active read lands on
    // the partial unique index instead
    match repo.insert(&record).await {
        Ok(()) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(RouteError::InvalidInput(String::from("already checked in")));
        }
        Err(e) => return Err(e.into()),
    }

    Gamification::new(state.db_pool)
        .touch_streak(&user.user_id, record.check_in)
        .await?;

    Recorder::new(state.db_pool)
        .activity(
            &user.user_id,
            &user.name,
            "check_in",
            format!("{} checked in to the studio", user.name),
            json!({}),
        )
        .await;

    Ok(Json(record))
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn check_out(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<CheckOutSummary> {
    let repo = AttendanceRepository::new(state.db_pool);

    let active = repo
        .find_active(&user.user_id)
        .await?
        .ok_or_else(|| RouteError::InvalidInput(String::from("not checked in")))?;

    let check_out = Utc::now();
    let duration_minutes = (check_out - active.check_in).num_minutes().max(0) as i32;
    let xp_earned = i64::from(duration_minutes.min(MAX_SESSION_XP));

    let closed = repo
        .close(&active.attendance_id, check_out, duration_minutes, xp_earned)
        .await?;
    if !closed {
        return Err(RouteError::InvalidInput(String::from("not checked in")));
    }

    if xp_earned > 0
        && let Some(summary) = Gamification::new(state.db_pool)
            .grant_xp(
                &user.user_id,
                xp_earned,
                "attendance",
                &format!("Studio session ({duration_minutes} mins)"),
            )
            .await?
    {
        tracing::debug!(
            xp = summary.xp,
            level = summary.level,
            "attendance xp applied"
        );
    }

    Recorder::new(state.db_pool)
        .activity(
            &user.user_id,
            &user.name,
            "check_out",
            format!("{} checked out after {duration_minutes} minutes", user.name),
            json!({}),
        )
        .await;

    Ok(Json(CheckOutSummary {
        attendance_id: active.attendance_id,
        duration_minutes,
        xp_earned,
    }))
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn history(
    Query(param): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<Vec<Attendance>> {
    let records = AttendanceRepository::new(state.db_pool)
        .history(&user.user_id, param.limit)
        .await?;

    Ok(Json(records))
}

/// Per-date visit count and minutes over the last 90 days.
#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn heatmap(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<BTreeMap<String, HeatmapBucket>> {
    let since = Utc::now() - Duration::days(HEATMAP_DAYS);
    let records = AttendanceRepository::new(state.db_pool)
        .since(&user.user_id, since)
        .await?;

    let mut heatmap: BTreeMap<String, HeatmapBucket> = BTreeMap::new();
    for record in records {
        let bucket = heatmap
            .entry(record.check_in.format("%Y-%m-%d").to_string())
            .or_default();
        bucket.count += 1;
        bucket.duration += i64::from(record.duration_minutes);
    }

    Ok(Json(heatmap))
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn status(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<AttendanceStatus> {
    let active = AttendanceRepository::new(state.db_pool)
        .find_active(&user.user_id)
        .await?;

    Ok(Json(AttendanceStatus {
        is_checked_in: active.is_some(),
        attendance: active,
    }))
}
