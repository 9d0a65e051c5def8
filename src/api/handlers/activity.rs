use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult};
use crate::db::models::events::ActivityItem;
use crate::db::prelude::ActivityRepository;

#[inline]
const fn default_feed_limit() -> i64 {
    30
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_feed_limit")]
    pub limit: i64,
}

#[instrument(skip(state, _user))]
pub async fn feed(
    Query(param): Query<FeedQuery>,
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> JsonResult<Vec<ActivityItem>> {
    let items = ActivityRepository::new(state.db_pool)
        .feed(param.limit)
        .await?;

    Ok(Json(items))
}
