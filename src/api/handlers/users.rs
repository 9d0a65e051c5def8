use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::instrument;

use crate::api::extract::CurrentUser;
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::models::badge::Badge;
use crate::db::models::user::{OnboardingRequest, ProfileUpdate, User};
use crate::db::prelude::{
    AttendanceRepository, BadgeRepository, ContributionRepository, ScoreRepository,
    TrackRepository, UserBadgeRepository, UserRepository, XpEventRepository,
};
use crate::gamification::{BadgeKind, Gamification};
use crate::util::prefixed_id;

#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub attendance_count: i64,
    pub track_count: i64,
    pub contribution_count: i64,
    pub match_count: i64,
    pub badge_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub stats: ProfileStats,
    pub badges: Vec<Badge>,
}

#[instrument(skip(state, user), fields(user_id = user.user_id.0))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> JsonResult<ProfileResponse> {
    let attendance_repo = AttendanceRepository::new(state.db_pool);
    let track_repo = TrackRepository::new(state.db_pool);
    let contribution_repo = ContributionRepository::new(state.db_pool);
    let score_repo = ScoreRepository::new(state.db_pool);
    let user_badge_repo = UserBadgeRepository::new(state.db_pool);
    let (attendance_count, track_count, contribution_count, match_count, earned) = futures::try_join!(
        attendance_repo.count_for_user(&user.user_id),
        track_repo.count_by_creator(&user.user_id),
        contribution_repo.count_for_user(&user.user_id),
        score_repo.count_for_user(&user.user_id),
        user_badge_repo.for_user(&user.user_id),
    )?;

    let badge_ids: Vec<String> = earned.iter().map(|b| b.badge_id.clone()).collect();
    let badges = BadgeRepository::new(state.db_pool).by_ids(&badge_ids).await?;

    Ok(Json(ProfileResponse {
        stats: ProfileStats {
            attendance_count,
            track_count,
            contribution_count,
            match_count,
            badge_count: earned.len() as i64,
        },
        badges,
        user,
    }))
}

#[instrument(skip(state, user, update), fields(user_id = user.user_id.0))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> JsonResult<User> {
    let users = UserRepository::new(state.db_pool);

    let roles = update
        .roles
        .map(|roles| roles.iter().map(|r| r.as_str().to_string()).collect());
    users
        .update_profile(&user.user_id, update.name, roles, update.goals)
        .await?;

    let updated = users
        .get_by_id(&user.user_id)
        .await?
        .ok_or(RouteError::NotFound("user"))?;

    Ok(Json(updated))
}

#[instrument(skip(state, user, data), fields(user_id = user.user_id.0))]
pub async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<OnboardingRequest>,
) -> JsonResult<User> {
    let users = UserRepository::new(state.db_pool);

    let roles: Vec<String> = data.roles.iter().map(|r| r.as_str().to_string()).collect();
    users
        .complete_onboarding(&user.user_id, &data.name, &roles, &data.goals)
        .await?;

    Gamification::new(state.db_pool)
        .evaluate_and_award(&user.user_id, BadgeKind::Onboarding, 1)
        .await?;

    // ledger entry only; the actual onboarding payout flows through the
    // badge reward above
    XpEventRepository::new(state.db_pool)
        .insert(&crate::db::models::events::XpEvent {
            event_id: prefixed_id("event"),
            user_id: user.user_id.clone(),
            event_type: String::from("onboarding_complete"),
            xp_amount: 100,
            description: String::from("Completed onboarding"),
            metadata: serde_json::json!({}),
            flagged: false,
            flag_reason: None,
            flagged_by: None,
            created_at: chrono::Utc::now(),
        })
        .await?;

    let updated = users
        .get_by_id(&user.user_id)
        .await?
        .ok_or(RouteError::NotFound("user"))?;

    Ok(Json(updated))
}
