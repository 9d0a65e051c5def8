use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::models::Pagination;
use crate::db::models::track::{
    ContributionCreate, Track, TrackContribution, TrackCreate, TrackDetail,
};
use crate::db::prelude::{ContributionRepository, TrackRepository, UserRepository};
use crate::gamification::{BadgeKind, Gamification};
use crate::recorder::Recorder;
use crate::util::prefixed_id;

const TRACK_CREATE_XP: i64 = 50;
const CONTRIBUTION_XP: i64 = 30;

async fn with_contributions(
    state: &AppState,
    track: Track,
) -> Result<TrackDetail, sqlx::Error> {
    let contributions = ContributionRepository::new(state.db_pool)
        .for_track(&track.track_id)
        .await?;

    let contributor_ids: Vec<String> = contributions
        .iter()
        .map(|c| c.user_id.0.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let contributor_details = UserRepository::new(state.db_pool)
        .summaries_by_ids(&contributor_ids)
        .await?;

    Ok(TrackDetail {
        track,
        contributions,
        contributor_details,
    })
}

#[instrument(skip(state, _user))]
pub async fn list_tracks(
    Query(param): Query<Pagination>,
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> JsonResult<Vec<TrackDetail>> {
    let tracks = TrackRepository::new(state.db_pool)
        .list(param.limit, param.offset)
        .await?;

    let mut detailed = Vec::with_capacity(tracks.len());
    for track in tracks {
        detailed.push(with_contributions(&state, track).await?);
    }

    Ok(Json(detailed))
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn create_track(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<TrackCreate>,
) -> JsonResult<Track> {
    let track = Track {
        track_id: prefixed_id("track"),
        title: data.title,
        description: data.description,
        genre: data.genre,
        duration_seconds: data.duration_seconds,
        cover_image: data.cover_image,
        audio_url: None,
        created_by: user.user_id.clone(),
        contributors: vec![user.user_id.0.clone()],
        listens: 0,
        likes: 0,
        shares: 0,
        created_at: Utc::now(),
    };

    let repo = TrackRepository::new(state.db_pool);
    repo.insert(&track).await?;

    let engine = Gamification::new(state.db_pool);
    engine
        .grant_xp(&user.user_id, TRACK_CREATE_XP, "music", "Created a new track")
        .await?;

    let track_count = repo.count_by_creator(&user.user_id).await?;
    engine
        .evaluate_and_award(&user.user_id, BadgeKind::Tracks, track_count)
        .await?;

    Recorder::new(state.db_pool)
        .activity(
            &user.user_id,
            &user.name,
            "track_created",
            format!("{} created track: {}", user.name, track.title),
            json!({}),
        )
        .await;

    Ok(Json(track))
}

#[instrument(skip(state, _user))]
pub async fn get_track(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(track_id): Path<String>,
) -> JsonResult<TrackDetail> {
    let track = TrackRepository::new(state.db_pool)
        .get_by_id(&track_id)
        .await?
        .ok_or(RouteError::NotFound("track"))?;

    Ok(Json(with_contributions(&state, track).await?))
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn add_contribution(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(track_id): Path<String>,
    Json(data): Json<ContributionCreate>,
) -> JsonResult<TrackContribution> {
    let repo = TrackRepository::new(state.db_pool);
    repo.get_by_id(&track_id)
        .await?
        .ok_or(RouteError::NotFound("track"))?;

    let contribution = TrackContribution {
        contribution_id: prefixed_id("contrib"),
        track_id: track_id.clone(),
        user_id: user.user_id.clone(),
        contribution_type: data.contribution_type.as_str().to_string(),
        notes: data.notes,
        xp_earned: CONTRIBUTION_XP,
        created_at: Utc::now(),
    };

    ContributionRepository::new(state.db_pool)
        .insert(&contribution)
        .await?;
    repo.add_contributor(&track_id, &user.user_id).await?;

    Gamification::new(state.db_pool)
        .grant_xp(
            &user.user_id,
            CONTRIBUTION_XP,
            "music",
            &format!("Contributed {} to track", data.contribution_type.as_str()),
        )
        .await?;

    Recorder::new(state.db_pool)
        .activity(
            &user.user_id,
            &user.name,
            "contribution",
            format!(
                "{} contributed {} to a track",
                user.name,
                data.contribution_type.as_str()
            ),
            json!({}),
        )
        .await;

    Ok(Json(contribution))
}

/// Listen counters move independently of XP.
#[instrument(skip(state, _user))]
pub async fn record_listen(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(track_id): Path<String>,
) -> JsonResult<Value> {
    TrackRepository::new(state.db_pool)
        .increment_listens(&track_id)
        .await?;

    Ok(Json(json!({"success": true})))
}

#[instrument(skip(state, _user))]
pub async fn like_track(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(track_id): Path<String>,
) -> JsonResult<Value> {
    TrackRepository::new(state.db_pool)
        .increment_likes(&track_id)
        .await?;

    Ok(Json(json!({"success": true})))
}
