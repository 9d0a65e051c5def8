use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::redis::snapshot;
use crate::leaderboard::{
    Category, CategoryInfo, LeaderboardAggregator, LeaderboardEntry, Period,
};

#[inline]
const fn default_leaderboard_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub period: Period,
    #[serde(default = "default_leaderboard_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub category: String,
    pub period: String,
    pub entries: Vec<LeaderboardEntry>,
    pub updated_at: DateTime<Utc>,
}

#[instrument(skip(_user))]
pub async fn list_categories(_user: CurrentUser) -> JsonResult<Vec<CategoryInfo>> {
    Ok(Json(Category::catalog()))
}

#[instrument(skip(state, _user))]
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(category): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> JsonResult<LeaderboardResponse> {
    let category =
        Category::from_slug(&category).ok_or(RouteError::UnknownCategory(category))?;

    let key = snapshot::snapshot_key(category.slug(), query.period.slug(), query.limit);
    let mut redis = state.redis_pool.clone();

    if let Some(cached) = snapshot::fetch(&mut redis, &key).await
        && let Ok(response) = serde_json::from_str::<LeaderboardResponse>(&cached)
    {
        tracing::debug!(key, "serving leaderboard from snapshot");
        return Ok(Json(response));
    }

    let limit = query.limit.max(0) as usize;
    let entries = LeaderboardAggregator::new(state.db_pool)
        .compute(category, query.period, limit, Utc::now())
        .await?;

    let response = LeaderboardResponse {
        category: category.slug().to_string(),
        period: query.period.slug().to_string(),
        entries,
        updated_at: Utc::now(),
    };

    if let Ok(payload) = serde_json::to_string(&response) {
        snapshot::store(&mut redis, &key, &payload).await;
    }

    Ok(Json(response))
}
