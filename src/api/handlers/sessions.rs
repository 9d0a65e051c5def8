use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult};
use crate::db::models::session::{StudioSession, StudioSessionCreate};
use crate::db::prelude::StudioSessionRepository;
use crate::util::prefixed_id;

#[inline]
const fn default_upcoming() -> bool {
    true
}

#[inline]
const fn default_session_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    #[serde(default = "default_upcoming")]
    pub upcoming: bool,
    #[serde(default = "default_session_limit")]
    pub limit: i64,
}

#[instrument(skip(state, _user))]
pub async fn list_sessions(
    Query(param): Query<SessionListQuery>,
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> JsonResult<Vec<StudioSession>> {
    let after = param.upcoming.then(Utc::now);
    let sessions = StudioSessionRepository::new(state.db_pool)
        .list(after, param.limit)
        .await?;

    Ok(Json(sessions))
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn create_studio_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<StudioSessionCreate>,
) -> JsonResult<StudioSession> {
    let session = StudioSession {
        session_id: prefixed_id("session"),
        title: data.title,
        description: data.description,
        start_time: data.start_time,
        end_time: data.end_time,
        max_participants: data.max_participants,
        session_type: data.session_type,
        created_by: user.user_id,
        created_at: Utc::now(),
    };

    StudioSessionRepository::new(state.db_pool)
        .insert(&session)
        .await?;

    Ok(Json(session))
}
