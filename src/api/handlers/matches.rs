use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::models::gaming::{
    GameMatch, GameScore, MatchCreate, MatchDetail, MatchOutcome, MatchStatus, ScoreSubmit,
};
use crate::db::models::user::UserId;
use crate::db::prelude::{MatchRepository, ScoreRepository, UserRepository};
use crate::gamification::{BadgeKind, Gamification};
use crate::recorder::Recorder;
use crate::util::prefixed_id;

const MAX_SCORE: i64 = 999_999;
const VICTORY_XP: i64 = 50;

#[inline]
const fn default_match_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct MatchListQuery {
    pub status: Option<String>,
    #[serde(default = "default_match_limit")]
    pub limit: i64,
}

async fn with_details(state: &AppState, game_match: GameMatch) -> Result<MatchDetail, sqlx::Error> {
    let participant_details = UserRepository::new(state.db_pool)
        .summaries_by_ids(&game_match.participants)
        .await?;
    let scores = ScoreRepository::new(state.db_pool)
        .for_match(&game_match.match_id)
        .await?;

    Ok(MatchDetail {
        game_match,
        participant_details,
        scores,
    })
}

#[instrument(skip(state, _user))]
pub async fn list_matches(
    Query(param): Query<MatchListQuery>,
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> JsonResult<Vec<MatchDetail>> {
    let matches = MatchRepository::new(state.db_pool)
        .list(param.status.as_deref(), param.limit)
        .await?;

    let mut detailed = Vec::with_capacity(matches.len());
    for game_match in matches {
        detailed.push(with_details(&state, game_match).await?);
    }

    Ok(Json(detailed))
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn create_match(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<MatchCreate>,
) -> JsonResult<GameMatch> {
    let mut participants = data.participants;
    if !participants.contains(&user.user_id.0) {
        participants.push(user.user_id.0.clone());
    }

    let game_match = GameMatch {
        match_id: prefixed_id("match"),
        title: data.title,
        game_type: data.game_type.as_str().to_string(),
        game_name: data.game_name,
        participants,
        winner_id: None,
        status: MatchStatus::Pending.as_str().to_string(),
        created_by: user.user_id.clone(),
        started_at: None,
        ended_at: None,
        created_at: Utc::now(),
    };

    MatchRepository::new(state.db_pool).insert(&game_match).await?;

    Recorder::new(state.db_pool)
        .activity(
            &user.user_id,
            &user.name,
            "match_created",
            format!(
                "{} created a {} match: {}",
                user.name,
                game_match.game_type,
                game_match.title
            ),
            json!({}),
        )
        .await;

    Ok(Json(game_match))
}

#[instrument(skip(state, _user))]
pub async fn get_match(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(match_id): Path<String>,
) -> JsonResult<MatchDetail> {
    let game_match = MatchRepository::new(state.db_pool)
        .get_by_id(&match_id)
        .await?
        .ok_or(RouteError::NotFound("match"))?;

    Ok(Json(with_details(&state, game_match).await?))
}

/// Only the creator (or an admin) moves a match into play.
#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn start_match(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(match_id): Path<String>,
) -> JsonResult<Value> {
    let repo = MatchRepository::new(state.db_pool);
    let game_match = repo
        .get_by_id(&match_id)
        .await?
        .ok_or(RouteError::NotFound("match"))?;

    if game_match.created_by != user.user_id && !user.is_admin {
        return Err(RouteError::Forbidden("not authorized"));
    }

    repo.start(&match_id, Utc::now()).await?;

    Ok(Json(json!({"success": true})))
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(match_id): Path<String>,
    Json(data): Json<ScoreSubmit>,
) -> JsonResult<GameScore> {
    MatchRepository::new(state.db_pool)
        .get_by_id(&match_id)
        .await?
        .ok_or(RouteError::NotFound("match"))?;

    if !(0..=MAX_SCORE).contains(&data.score) {
        return Err(RouteError::InvalidInput(String::from("invalid score")));
    }

    let mut xp_earned = (data.score / 100).min(50) + i64::from(data.kills) * 5;
    if data.rank_position == 1 {
        xp_earned += 100;
    } else if data.rank_position <= 3 {
        xp_earned += 50;
    }

    let score = GameScore {
        score_id: prefixed_id("score"),
        match_id,
        user_id: UserId(data.user_id),
        score: data.score,
        kills: data.kills,
        deaths: data.deaths,
        assists: data.assists,
        rank_position: data.rank_position,
        xp_earned,
        created_at: Utc::now(),
    };

    ScoreRepository::new(state.db_pool).insert(&score).await?;

    if xp_earned > 0 {
        Gamification::new(state.db_pool)
            .grant_xp(
                &score.user_id,
                xp_earned,
                "gaming",
                &format!("Match score: {}", score.score),
            )
            .await?;
    }

    Ok(Json(score))
}

/// Completes the match; the highest scorer at this moment becomes the
/// recorded winner and collects the victory bonus.
#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn complete_match(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(match_id): Path<String>,
) -> JsonResult<MatchOutcome> {
    let repo = MatchRepository::new(state.db_pool);
    repo.get_by_id(&match_id)
        .await?
        .ok_or(RouteError::NotFound("match"))?;

    let scores = ScoreRepository::new(state.db_pool);
    let winner_id = scores
        .top_for_match(&match_id)
        .await?
        .map(|top| top.user_id.0);

    repo.complete(&match_id, winner_id.as_deref(), Utc::now())
        .await?;

    if let Some(winner) = &winner_id {
        let winner_id = UserId(winner.clone());
        let engine = Gamification::new(state.db_pool);

        engine
            .grant_xp(&winner_id, VICTORY_XP, "gaming", "Match victory!")
            .await?;

        let wins = scores.wins_for_user(&winner_id).await?;
        engine
            .evaluate_and_award(&winner_id, BadgeKind::Wins, wins)
            .await?;

        if let Some(winner_user) = UserRepository::new(state.db_pool)
            .get_by_id(&winner_id)
            .await?
        {
            Recorder::new(state.db_pool)
                .activity(
                    &winner_id,
                    &winner_user.name,
                    "match_won",
                    format!("{} won the match!", winner_user.name),
                    json!({}),
                )
                .await;
        }
    }

    Ok(Json(MatchOutcome {
        success: true,
        winner_id,
    }))
}
