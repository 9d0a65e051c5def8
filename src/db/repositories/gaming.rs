use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::gaming::{GameMatch, GameScore, MatchStatus};
use crate::db::models::user::UserId;
use crate::db::repositories::sql_fragment::SCORE_FIELDS;

const MATCH_FIELDS: &str = r#"
    match_id,
    title,
    game_type,
    game_name,
    participants,
    winner_id,
    status,
    created_by,
    started_at,
    ended_at,
    created_at
"#;

pub struct MatchRepository {
    pool: &'static Pool<Postgres>,
}

impl MatchRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<&str>, limit: i64) -> SqlxResult<Vec<GameMatch>> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, GameMatch>(&format!(
                    "SELECT {MATCH_FIELDS} FROM game_matches WHERE status = $1 ORDER BY created_at DESC LIMIT $2"
                ))
                .bind(status)
                .bind(limit)
                .fetch_all(self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, GameMatch>(&format!(
                    "SELECT {MATCH_FIELDS} FROM game_matches ORDER BY created_at DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(self.pool)
                .await
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, match_id: &str) -> SqlxResult<Option<GameMatch>> {
        sqlx::query_as::<_, GameMatch>(&format!(
            "SELECT {MATCH_FIELDS} FROM game_matches WHERE match_id = $1"
        ))
        .bind(match_id)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self, game_match), fields(match_id = game_match.match_id))]
    pub async fn insert(&self, game_match: &GameMatch) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO game_matches (
                match_id,
                title,
                game_type,
                game_name,
                participants,
                winner_id,
                status,
                created_by,
                started_at,
                ended_at,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&game_match.match_id)
        .bind(&game_match.title)
        .bind(&game_match.game_type)
        .bind(&game_match.game_name)
        .bind(&game_match.participants)
        .bind(&game_match.winner_id)
        .bind(&game_match.status)
        .bind(&game_match.created_by)
        .bind(game_match.started_at)
        .bind(game_match.ended_at)
        .bind(game_match.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn start(&self, match_id: &str, at: DateTime<Utc>) -> SqlxResult<()> {
        sqlx::query("UPDATE game_matches SET status = $2, started_at = $3 WHERE match_id = $1")
            .bind(match_id)
            .bind(MatchStatus::InProgress.as_str())
            .bind(at)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Records the winner exactly once at completion.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        match_id: &str,
        winner_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> SqlxResult<()> {
        sqlx::query(
            r#"
            UPDATE game_matches
            SET status = $2,
                ended_at = $3,
                winner_id = $4
            WHERE match_id = $1
            "#,
        )
        .bind(match_id)
        .bind(MatchStatus::Completed.as_str())
        .bind(at)
        .bind(winner_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

pub struct ScoreRepository {
    pool: &'static Pool<Postgres>,
}

impl ScoreRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, score), fields(match_id = score.match_id, user_id = score.user_id.0))]
    pub async fn insert(&self, score: &GameScore) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO game_scores (
                score_id,
                match_id,
                user_id,
                score,
                kills,
                deaths,
                assists,
                rank_position,
                xp_earned,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&score.score_id)
        .bind(&score.match_id)
        .bind(&score.user_id)
        .bind(score.score)
        .bind(score.kills)
        .bind(score.deaths)
        .bind(score.assists)
        .bind(score.rank_position)
        .bind(score.xp_earned)
        .bind(score.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn for_match(&self, match_id: &str) -> SqlxResult<Vec<GameScore>> {
        sqlx::query_as::<_, GameScore>(&format!(
            "SELECT {SCORE_FIELDS} FROM game_scores WHERE match_id = $1 ORDER BY score DESC"
        ))
        .bind(match_id)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn top_for_match(&self, match_id: &str) -> SqlxResult<Option<GameScore>> {
        sqlx::query_as::<_, GameScore>(&format!(
            "SELECT {SCORE_FIELDS} FROM game_scores WHERE match_id = $1 ORDER BY score DESC LIMIT 1"
        ))
        .bind(match_id)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn count_for_user(&self, user_id: &UserId) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM game_scores WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn wins_for_user(&self, user_id: &UserId) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM game_scores WHERE user_id = $1 AND rank_position = 1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await
    }
}
