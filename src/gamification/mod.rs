//! XP ledger, leveling, streaks and badge awards. Follow-on effects
//! (level-up badge checks, badge XP rewards) are driven through an explicit
//! queue so the XP -> level -> badge -> XP chain stays iterative and
//! inspectable. The chain terminates because every badge is granted at most
//! once per user.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{Pool, Postgres};
use thiserror::Error;
use tracing::instrument;

use crate::db::models::badge::{Badge, UserBadge};
use crate::db::models::events::XpEvent;
use crate::db::models::user::UserId;
use crate::db::prelude::{BadgeRepository, UserBadgeRepository};
use crate::util::prefixed_id;

pub mod badges;
pub mod streak;
pub mod xp;

pub use badges::BadgeKind;

pub type GamificationResult<T> = core::result::Result<T, GamificationError>;

#[derive(Debug, Error)]
pub enum GamificationError {
    #[error("xp amount must be positive (got {0})")]
    InvalidAmount(i64),

    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct GrantSummary {
    pub xp: i64,
    pub level: i32,
    pub leveled_up: bool,
}

#[derive(Debug)]
enum Effect {
    GrantXp {
        user_id: UserId,
        amount: i64,
        category: String,
        description: String,
    },
    CheckBadges {
        user_id: UserId,
        kind: BadgeKind,
        value: i64,
    },
}

pub struct Gamification {
    pool: &'static Pool<Postgres>,
}

impl Gamification {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Appends an XP ledger event and advances the user aggregate. A
    /// missing user is a silent no-op; gamification never blocks the
    /// primary action. Returns the new (remainder, level) on success.
    #[instrument(skip(self, description), fields(user_id = user_id.0))]
    pub async fn grant_xp(
        &self,
        user_id: &UserId,
        amount: i64,
        category: &str,
        description: &str,
    ) -> GamificationResult<Option<GrantSummary>> {
        if amount <= 0 {
            return Err(GamificationError::InvalidAmount(amount));
        }

        let Some(summary) = self
            .apply_grant(user_id, amount, category, description)
            .await?
        else {
            tracing::debug!(user_id = user_id.0, "xp grant for unknown user ignored");
            return Ok(None);
        };

        let mut effects = VecDeque::new();
        if summary.leveled_up {
            effects.push_back(Effect::CheckBadges {
                user_id: user_id.clone(),
                kind: BadgeKind::Level,
                value: i64::from(summary.level),
            });
        }
        self.drain(effects).await?;

        Ok(Some(summary))
    }

    /// Applies the daily streak policy for a check-in at `as_of` and
    /// updates `last_active`. Returns the new streak value.
    #[instrument(skip(self), fields(user_id = user_id.0))]
    pub async fn touch_streak(
        &self,
        user_id: &UserId,
        as_of: DateTime<Utc>,
    ) -> GamificationResult<Option<i32>> {
        let Some(streak) = self.apply_streak(user_id, as_of).await? else {
            tracing::debug!(user_id = user_id.0, "streak touch for unknown user ignored");
            return Ok(None);
        };

        let mut effects = VecDeque::new();
        effects.push_back(Effect::CheckBadges {
            user_id: user_id.clone(),
            kind: BadgeKind::Streak,
            value: i64::from(streak),
        });
        self.drain(effects).await?;

        Ok(Some(streak))
    }

    /// Awards every badge of `kind` whose threshold `value` satisfies,
    /// then applies any follow-on XP rewards.
    #[instrument(skip(self), fields(user_id = user_id.0))]
    pub async fn evaluate_and_award(
        &self,
        user_id: &UserId,
        kind: BadgeKind,
        value: i64,
    ) -> GamificationResult<()> {
        let mut effects = VecDeque::new();
        effects.push_back(Effect::CheckBadges {
            user_id: user_id.clone(),
            kind,
            value,
        });
        self.drain(effects).await
    }

    /// Single ledger append + aggregate advance, atomic. The row lock
    /// closes the lost-update window between reading the current xp and
    /// writing the new one.
    async fn apply_grant(
        &self,
        user_id: &UserId,
        amount: i64,
        category: &str,
        description: &str,
    ) -> GamificationResult<Option<GrantSummary>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, (i64, i32)>(
            "SELECT xp, level FROM users WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((remainder, level)) = row else {
            return Ok(None);
        };

        let next = xp::advance(level, remainder + amount);

        sqlx::query("UPDATE users SET xp = $2, level = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(next.remainder)
            .bind(next.level)
            .execute(&mut *tx)
            .await?;

        let event = XpEvent {
            event_id: prefixed_id("event"),
            user_id: user_id.clone(),
            event_type: category.to_string(),
            xp_amount: amount,
            description: description.to_string(),
            metadata: json!({}),
            flagged: false,
            flag_reason: None,
            flagged_by: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO xp_events (
                event_id,
                user_id,
                event_type,
                xp_amount,
                description,
                metadata,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&event.event_id)
        .bind(&event.user_id)
        .bind(&event.event_type)
        .bind(event.xp_amount)
        .bind(&event.description)
        .bind(&event.metadata)
        .bind(event.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let summary = GrantSummary {
            xp: next.remainder,
            level: next.level,
            leveled_up: next.level > level,
        };

        if summary.leveled_up {
            tracing::info!(
                user_id = user_id.0,
                level = summary.level,
                "user leveled up"
            );
        }

        Ok(Some(summary))
    }

    async fn apply_streak(
        &self,
        user_id: &UserId,
        as_of: DateTime<Utc>,
    ) -> GamificationResult<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, (i32, Option<DateTime<Utc>>)>(
            "SELECT streak_days, last_active FROM users WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((current, last_active)) = row else {
            return Ok(None);
        };

        let streak = streak::next_streak(
            last_active.map(|t| t.date_naive()),
            current,
            as_of.date_naive(),
        );

        sqlx::query("UPDATE users SET streak_days = $2, last_active = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(streak)
            .bind(as_of)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(streak))
    }

    async fn drain(&self, mut effects: VecDeque<Effect>) -> GamificationResult<()> {
        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::CheckBadges {
                    user_id,
                    kind,
                    value,
                } => {
                    let defs = BadgeRepository::new(self.pool).by_kind(kind.as_str()).await?;
                    for badge in badges::satisfied(&defs, value) {
                        if self.award(&user_id, badge).await? && badge.xp_reward > 0 {
                            effects.push_back(Effect::GrantXp {
                                user_id: user_id.clone(),
                                amount: badge.xp_reward,
                                category: String::from("badge"),
                                description: format!("Earned badge: {}", badge.name),
                            });
                        }
                    }
                }

                Effect::GrantXp {
                    user_id,
                    amount,
                    category,
                    description,
                } => {
                    if let Some(summary) = self
                        .apply_grant(&user_id, amount, &category, &description)
                        .await?
                        && summary.leveled_up
                    {
                        effects.push_back(Effect::CheckBadges {
                            user_id,
                            kind: BadgeKind::Level,
                            value: i64::from(summary.level),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Idempotent grant; true only when the badge is newly earned.
    async fn award(&self, user_id: &UserId, badge: &Badge) -> GamificationResult<bool> {
        let grant = UserBadge {
            user_badge_id: prefixed_id("ub"),
            user_id: user_id.clone(),
            badge_id: badge.badge_id.clone(),
            earned_at: Utc::now(),
        };

        let granted = UserBadgeRepository::new(self.pool).try_grant(&grant).await?;
        if granted {
            tracing::info!(
                user_id = user_id.0,
                badge_id = badge.badge_id,
                "badge earned"
            );
        }

        Ok(granted)
    }
}
