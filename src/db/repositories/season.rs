use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::season::Season;

pub struct SeasonRepository {
    pool: &'static Pool<Postgres>,
}

impl SeasonRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, season), fields(season_id = season.season_id))]
    pub async fn upsert(&self, season: &Season) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO seasons (season_id, name, start_date, end_date, is_active, rewards)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (season_id)
            DO UPDATE SET
                name = $2,
                start_date = $3,
                end_date = $4,
                is_active = $5,
                rewards = $6
            "#,
        )
        .bind(&season.season_id)
        .bind(&season.name)
        .bind(season.start_date)
        .bind(season.end_date)
        .bind(season.is_active)
        .bind(&season.rewards)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
