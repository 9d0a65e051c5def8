use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::models::badge::{Badge, UserBadge};
use crate::db::models::user::UserId;

const BADGE_FIELDS: &str = r#"
    badge_id,
    name,
    description,
    icon,
    category,
    requirement_type,
    requirement_value,
    xp_reward,
    rarity
"#;

pub struct BadgeRepository {
    pool: &'static Pool<Postgres>,
}

impl BadgeRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn all(&self) -> SqlxResult<Vec<Badge>> {
        sqlx::query_as::<_, Badge>(&format!("SELECT {BADGE_FIELDS} FROM badges ORDER BY badge_id"))
            .fetch_all(self.pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, badge_id: &str) -> SqlxResult<Option<Badge>> {
        sqlx::query_as::<_, Badge>(&format!(
            "SELECT {BADGE_FIELDS} FROM badges WHERE badge_id = $1"
        ))
        .bind(badge_id)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn by_kind(&self, requirement_type: &str) -> SqlxResult<Vec<Badge>> {
        sqlx::query_as::<_, Badge>(&format!(
            "SELECT {BADGE_FIELDS} FROM badges WHERE requirement_type = $1 ORDER BY requirement_value ASC"
        ))
        .bind(requirement_type)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, ids))]
    pub async fn by_ids(&self, ids: &[String]) -> SqlxResult<Vec<Badge>> {
        sqlx::query_as::<_, Badge>(&format!(
            "SELECT {BADGE_FIELDS} FROM badges WHERE badge_id = ANY($1) ORDER BY badge_id"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, badge), fields(badge_id = badge.badge_id))]
    pub async fn upsert(&self, badge: &Badge) -> SqlxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO badges (
                badge_id,
                name,
                description,
                icon,
                category,
                requirement_type,
                requirement_value,
                xp_reward,
                rarity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (badge_id)
            DO UPDATE SET
                name = $2,
                description = $3,
                icon = $4,
                category = $5,
                requirement_type = $6,
                requirement_value = $7,
                xp_reward = $8,
                rarity = $9
            "#,
        )
        .bind(&badge.badge_id)
        .bind(&badge.name)
        .bind(&badge.description)
        .bind(&badge.icon)
        .bind(&badge.category)
        .bind(&badge.requirement_type)
        .bind(badge.requirement_value)
        .bind(badge.xp_reward)
        .bind(&badge.rarity)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

pub struct UserBadgeRepository {
    pool: &'static Pool<Postgres>,
}

impl UserBadgeRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn for_user(&self, user_id: &UserId) -> SqlxResult<Vec<UserBadge>> {
        sqlx::query_as::<_, UserBadge>(
            r#"
            SELECT user_badge_id, user_id, badge_id, earned_at
            FROM user_badges
            WHERE user_id = $1
            ORDER BY earned_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
    }

    /// Idempotent grant: returns false when the badge was already earned.
    #[instrument(skip(self, user_badge), fields(user_id = user_badge.user_id.0, badge_id = user_badge.badge_id))]
    pub async fn try_grant(&self, user_badge: &UserBadge) -> SqlxResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_badge_id, user_id, badge_id, earned_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, badge_id)
            DO NOTHING
            "#,
        )
        .bind(&user_badge.user_badge_id)
        .bind(&user_badge.user_id)
        .bind(&user_badge.badge_id)
        .bind(user_badge.earned_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
