use std::sync::Arc;

use axum::extract::State;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::{Duration, Utc};
use http::HeaderMap;
use http::header::SET_COOKIE;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::api::extract::{CurrentUser, SESSION_COOKIE, session_token};
use crate::api::server::{AppState, JsonResult, RouteError};
use crate::db::models::session::UserSession;
use crate::db::models::user::{User, UserId};
use crate::db::prelude::{SessionRepository, UserRepository};
use crate::util::env::Var;
use crate::util::prefixed_id;
use crate::var;

const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct SessionExchange {
    pub session_id: String,
}

/// Verified identity tuple handed over by the upstream provider.
#[derive(Debug, Deserialize)]
struct AuthSessionData {
    email: String,
    name: String,
    picture: Option<String>,
    session_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub session_token: String,
}

/// Exchanges an upstream session id for a local session. Credentials are
/// never seen here; the provider response is trusted as-is.
#[instrument(skip(state, body))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionExchange>,
) -> Result<impl IntoResponse, RouteError> {
    let auth_url = var!(Var::AuthSessionUrl).await?;

    let response = reqwest::Client::new()
        .get(auth_url)
        .header("X-Session-ID", &body.session_id)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(RouteError::Unauthenticated("invalid session_id"));
    }

    let data: AuthSessionData = response.json().await?;

    let users = UserRepository::new(state.db_pool);
    let user_id = match users.get_by_email(&data.email).await? {
        Some(existing) => {
            users
                .update_identity(&existing.user_id, &data.name, data.picture.as_deref())
                .await?;
            existing.user_id
        }
        None => {
            let user = User {
                user_id: UserId(prefixed_id("user")),
                email: data.email.clone(),
                name: data.name.clone(),
                picture: data.picture.clone(),
                roles: Vec::new(),
                level: 1,
                xp: 0,
                streak_days: 0,
                last_active: None,
                onboarding_completed: false,
                goals: Vec::new(),
                is_admin: false,
                created_at: Utc::now(),
            };
            users.insert(&user).await?;
            tracing::info!(user_id = user.user_id.0, "new user registered");
            user.user_id
        }
    };

    let sessions = SessionRepository::new(state.db_pool);
    sessions.delete_for_user(&user_id).await?;
    sessions
        .insert(&UserSession {
            session_token: data.session_token.clone(),
            user_id: user_id.clone(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            created_at: Utc::now(),
        })
        .await?;

    let user = users
        .get_by_id(&user_id)
        .await?
        .ok_or(RouteError::NotFound("user"))?;

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=None",
        data.session_token,
        SESSION_TTL_DAYS * 24 * 60 * 60,
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            user,
            session_token: data.session_token,
        }),
    ))
}

#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> JsonResult<User> {
    Ok(Json(user))
}

#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, RouteError> {
    if let Some(token) = session_token(&headers) {
        SessionRepository::new(state.db_pool)
            .delete_by_token(&token)
            .await?;
    }

    let cookie = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json::<Value>(json!({"message": "Logged out successfully"})),
    ))
}
