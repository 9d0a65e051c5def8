use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{MatchedPath, Request};
use axum::middleware::{Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::{HeaderValue, Method, StatusCode};
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::api::handlers::{
    activity, admin, attendance, auth, gamification, leaderboards, matches, sessions, tracks,
    users,
};
use crate::db::prelude::*;
use crate::db::redis::redis_pool::{RedisErr, redis_pool};
use crate::gamification::GamificationError;
use crate::util::env::{EnvErr, Var};
use crate::var;

pub type JsonResult<T> = core::result::Result<Json<T>, RouteError>;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: &'static PgPool,
    pub redis_pool: ConnectionManager,
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    let api = Router::new()
        //
        // identity exchange + session cookie
        .route("/auth/session", post(auth::create_session))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        //
        // profile + onboarding
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users/onboarding", post(users::complete_onboarding))
        //
        // studio sessions + attendance
        .route(
            "/sessions",
            get(sessions::list_sessions).post(sessions::create_studio_session),
        )
        .route("/attendance/check-in", post(attendance::check_in))
        .route("/attendance/check-out", post(attendance::check_out))
        .route("/attendance/history", get(attendance::history))
        .route("/attendance/heatmap", get(attendance::heatmap))
        .route("/attendance/status", get(attendance::status))
        //
        // tracks + contributions
        .route("/tracks", get(tracks::list_tracks).post(tracks::create_track))
        .route("/tracks/{track_id}", get(tracks::get_track))
        .route(
            "/tracks/{track_id}/contributions",
            post(tracks::add_contribution),
        )
        .route("/tracks/{track_id}/listen", post(tracks::record_listen))
        .route("/tracks/{track_id}/like", post(tracks::like_track))
        //
        // matches + scores
        .route(
            "/matches",
            get(matches::list_matches).post(matches::create_match),
        )
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/matches/{match_id}/start", post(matches::start_match))
        .route("/matches/{match_id}/scores", post(matches::submit_score))
        .route("/matches/{match_id}/complete", post(matches::complete_match))
        //
        // leaderboards
        .route("/leaderboards", get(leaderboards::list_categories))
        .route("/leaderboards/{category}", get(leaderboards::get_leaderboard))
        //
        // gamification surface
        .route("/gamification/stats", get(gamification::stats))
        .route("/badges", get(gamification::all_badges))
        .route("/user/badges", get(gamification::user_badges))
        .route("/activity/feed", get(activity::feed))
        //
        // admin + seed
        .route("/admin/audit-logs", get(admin::audit_logs))
        .route("/admin/users", get(admin::all_users))
        .route("/admin/flag-event", post(admin::flag_event))
        .route("/seed", post(admin::seed))
        //
        .route(
            "/",
            get(|| async { Json(json!({"message": "Studio Hub API", "version": env!("CARGO_PKG_VERSION")})) }),
        )
        .route("/health", get(|| async { Json(json!({"status": "healthy"})) }));

    Router::new()
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method();
                let uri = req.uri();

                let matched_path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|matched| matched.as_str());

                tracing::debug_span!("api_request", ?method, ?uri, ?matched_path)
            }),
        )
        .layer(from_fn(log_route_errors))
        .layer(cors)
        .with_state(state)
}

/// Browser clients send the session cookie cross-origin, so the wildcard
/// form of allow-origin is off the table; `*` in the config mirrors the
/// requesting origin instead.
async fn cors_layer() -> Result<CorsLayer, RouteError> {
    let allowed = var!(Var::CorsAllowOrigins).await?;

    let origin = if allowed.trim() == "*" {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = allowed
            .split(',')
            .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Surfaces handler errors into the request trace.
#[instrument(skip(request, next), fields(uri = request.uri().to_string()))]
async fn log_route_errors(request: Request, next: Next) -> Response {
    let res = next.run(request).await;
    if let Some(err) = res.extensions().get::<Arc<RouteError>>() {
        tracing::error!(error = ?err, "error occurred inside route handler");
    }

    res
}

#[instrument]
pub async fn serve() -> Result<(), RouteError> {
    let state = Arc::new(AppState {
        db_pool: db_pool().await?,
        redis_pool: redis_pool().await?.manager.clone(),
    });

    let app = router(state, cors_layer().await?);

    let port = var!(Var::ServerApiPort)
        .await?
        .parse::<u16>()
        .map_err(|_| RouteError::InvalidInput(String::from("SERVER_API_PORT is not a port")))?;

    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port);
    let listener = tokio::net::TcpListener::bind(socket_addr).await?;

    tracing::info!(
        server_url = &format!("http://127.0.0.1:{port}"),
        "server ready"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("unknown leaderboard category '{0}'")]
    UnknownCategory(String),

    #[error(transparent)]
    QueryError(#[from] PgError),

    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),

    #[error(transparent)]
    GamificationError(#[from] GamificationError),

    #[error(transparent)]
    RedisError(#[from] RedisErr),

    #[error("upstream auth exchange failed: {0}")]
    UpstreamAuth(#[from] reqwest::Error),

    #[error(transparent)]
    EnvError(#[from] EnvErr),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let (status, message, err) = match &self {
            RouteError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.to_string(), None),

            RouteError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{resource} not found"),
                None,
            ),

            RouteError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string(), None),

            RouteError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),

            RouteError::UnknownCategory(category) => (
                StatusCode::NOT_FOUND,
                format!("unknown leaderboard category '{category}'"),
                None,
            ),

            RouteError::GamificationError(inner) => match inner {
                GamificationError::InvalidAmount(_) => {
                    (StatusCode::BAD_REQUEST, inner.to_string(), None)
                }
                GamificationError::SqlxError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    inner.to_string(),
                    Some(self),
                ),
            },

            RouteError::UpstreamAuth(error) => {
                (StatusCode::BAD_GATEWAY, error.to_string(), Some(self))
            }

            RouteError::QueryError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),

            RouteError::SqlxError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),

            RouteError::RedisError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),

            RouteError::EnvError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),

            RouteError::IoError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),
        };

        let mut response = (status, Json(ErrorResponse { message })).into_response();
        if let Some(err) = err {
            response.extensions_mut().insert(Arc::new(err));
        }

        response
    }
}
