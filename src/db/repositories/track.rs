use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::track::{Track, TrackContribution};
use crate::db::models::user::UserId;

const TRACK_FIELDS: &str = r#"
    track_id,
    title,
    description,
    genre,
    duration_seconds,
    cover_image,
    audio_url,
    created_by,
    contributors,
    listens,
    likes,
    shares,
    created_at
"#;

const CONTRIBUTION_FIELDS: &str = r#"
    contribution_id,
    track_id,
    user_id,
    contribution_type,
    notes,
    xp_earned,
    created_at
"#;

pub struct TrackRepository {
    pool: &'static Pool<Postgres>,
}

impl TrackRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> SqlxResult<Vec<Track>> {
        sqlx::query_as::<_, Track>(&format!(
            "SELECT {TRACK_FIELDS} FROM tracks ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, track_id: &str) -> SqlxResult<Option<Track>> {
        sqlx::query_as::<_, Track>(&format!(
            "SELECT {TRACK_FIELDS} FROM tracks WHERE track_id = $1"
        ))
        .bind(track_id)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self, track), fields(track_id = track.track_id))]
    pub async fn insert(&self, track: &Track) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tracks (
                track_id,
                title,
                description,
                genre,
                duration_seconds,
                cover_image,
                audio_url,
                created_by,
                contributors,
                listens,
                likes,
                shares,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&track.track_id)
        .bind(&track.title)
        .bind(&track.description)
        .bind(&track.genre)
        .bind(track.duration_seconds)
        .bind(&track.cover_image)
        .bind(&track.audio_url)
        .bind(&track.created_by)
        .bind(&track.contributors)
        .bind(track.listens)
        .bind(track.likes)
        .bind(track.shares)
        .bind(track.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Append-only union into the contributor set.
    #[instrument(skip(self))]
    pub async fn add_contributor(&self, track_id: &str, user_id: &UserId) -> SqlxResult<()> {
        sqlx::query(
            r#"
            UPDATE tracks
            SET contributors = array_append(contributors, $2)
            WHERE track_id = $1 AND NOT ($2 = ANY(contributors))
            "#,
        )
        .bind(track_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn increment_listens(&self, track_id: &str) -> SqlxResult<()> {
        sqlx::query("UPDATE tracks SET listens = listens + 1 WHERE track_id = $1")
            .bind(track_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn increment_likes(&self, track_id: &str) -> SqlxResult<()> {
        sqlx::query("UPDATE tracks SET likes = likes + 1 WHERE track_id = $1")
            .bind(track_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn count_by_creator(&self, user_id: &UserId) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tracks WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
    }
}

pub struct ContributionRepository {
    pool: &'static Pool<Postgres>,
}

impl ContributionRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, contribution), fields(track_id = contribution.track_id))]
    pub async fn insert(&self, contribution: &TrackContribution) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO track_contributions (
                contribution_id,
                track_id,
                user_id,
                contribution_type,
                notes,
                xp_earned,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&contribution.contribution_id)
        .bind(&contribution.track_id)
        .bind(&contribution.user_id)
        .bind(&contribution.contribution_type)
        .bind(&contribution.notes)
        .bind(contribution.xp_earned)
        .bind(contribution.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn for_track(&self, track_id: &str) -> SqlxResult<Vec<TrackContribution>> {
        sqlx::query_as::<_, TrackContribution>(&format!(
            "SELECT {CONTRIBUTION_FIELDS} FROM track_contributions WHERE track_id = $1 ORDER BY created_at ASC"
        ))
        .bind(track_id)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn count_for_user(&self, user_id: &UserId) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM track_contributions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
    }
}
