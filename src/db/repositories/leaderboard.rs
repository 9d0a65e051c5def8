use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::leaderboard::rows::{
    AttendanceRow, ContributionRow, ProfileRow, ScoreRow, TrackRow,
};

/// Fetches the raw per-category event rows the ranking formulas aggregate
/// over. Rankings never read the cached user aggregate, so an admin
/// correction to a user's xp cannot skew them.
pub struct LeaderboardRepository {
    pool: &'static Pool<Postgres>,
}

impl LeaderboardRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn attendance_since(&self, since: DateTime<Utc>) -> SqlxResult<Vec<AttendanceRow>> {
        sqlx::query_as::<_, AttendanceRow>(
            "SELECT user_id, duration_minutes FROM attendance WHERE check_in >= $1",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn track_rows(&self) -> SqlxResult<Vec<TrackRow>> {
        sqlx::query_as::<_, TrackRow>("SELECT created_by, listens, likes FROM tracks")
            .fetch_all(self.pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn contribution_rows(&self) -> SqlxResult<Vec<ContributionRow>> {
        sqlx::query_as::<_, ContributionRow>("SELECT user_id FROM track_contributions")
            .fetch_all(self.pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn score_rows(&self) -> SqlxResult<Vec<ScoreRow>> {
        sqlx::query_as::<_, ScoreRow>(
            "SELECT user_id, score, kills, deaths, rank_position FROM game_scores",
        )
        .fetch_all(self.pool)
        .await
    }

    /// Display enrichment for already-ranked entries. Users deleted since
    /// aggregation simply come back missing here.
    #[instrument(skip(self, ids))]
    pub async fn profiles_by_ids(&self, ids: &[String]) -> SqlxResult<Vec<ProfileRow>> {
        sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, name, picture, level FROM users WHERE user_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await
    }
}
