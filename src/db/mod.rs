use std::sync::LazyLock;

use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::util::env::{self, Var};
use crate::var;

pub mod models;
pub mod redis;
pub mod repositories;

pub mod prelude {
    pub use crate::db::PgError;
    pub use crate::db::db_pool;

    pub use crate::db::models::attendance::Attendance;
    pub use crate::db::models::badge::{Badge, UserBadge};
    pub use crate::db::models::events::{ActivityItem, AuditLog, XpEvent};
    pub use crate::db::models::gaming::{GameMatch, GameScore};
    pub use crate::db::models::season::Season;
    pub use crate::db::models::session::{StudioSession, UserSession};
    pub use crate::db::models::track::{Track, TrackContribution};
    pub use crate::db::models::user::{User, UserId, UserSummary};

    pub use crate::db::repositories::attendance::AttendanceRepository;
    pub use crate::db::repositories::badge::{BadgeRepository, UserBadgeRepository};
    pub use crate::db::repositories::events::{
        ActivityRepository, AuditRepository, XpEventRepository,
    };
    pub use crate::db::repositories::gaming::{MatchRepository, ScoreRepository};
    pub use crate::db::repositories::leaderboard::LeaderboardRepository;
    pub use crate::db::repositories::season::SeasonRepository;
    pub use crate::db::repositories::session::{SessionRepository, StudioSessionRepository};
    pub use crate::db::repositories::track::{ContributionRepository, TrackRepository};
    pub use crate::db::repositories::user::UserRepository;
}

static DB_POOL: LazyLock<OnceCell<Db>> = LazyLock::new(OnceCell::new);
pub async fn db_pool() -> PgResult<&'static PgPool> {
    Ok(&DB_POOL
        .get_or_try_init(|| async { Db::new_pool().await })
        .await?
        .pool)
}

struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn new_pool() -> PgResult<Self> {
        let db_url = var!(Var::DatabaseUrl).await?;
        let pool = sqlx::PgPool::connect(db_url).await?;

        Ok(Self { pool })
    }
}

pub type PgResult<T> = core::result::Result<T, PgError>;

#[derive(Debug, Error)]
pub enum PgError {
    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),

    #[error(transparent)]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    EnvError(#[from] env::EnvErr),
}
