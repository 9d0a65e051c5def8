//! Ranked leaderboards. Each category is a tagged variant with its own
//! pure formula over raw event rows; the aggregator only fetches rows,
//! applies the formula, and enriches the ranked result with display data.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::db::prelude::LeaderboardRepository;

pub mod formulas;

pub mod rows {
    //! Raw event projections the formulas aggregate over.

    #[derive(Debug, Clone, sqlx::FromRow)]
    pub struct AttendanceRow {
        pub user_id: String,
        pub duration_minutes: i32,
    }

    #[derive(Debug, Clone, sqlx::FromRow)]
    pub struct TrackRow {
        pub created_by: String,
        pub listens: i64,
        pub likes: i64,
    }

    #[derive(Debug, Clone, sqlx::FromRow)]
    pub struct ContributionRow {
        pub user_id: String,
    }

    #[derive(Debug, Clone, sqlx::FromRow)]
    pub struct ScoreRow {
        pub user_id: String,
        pub score: i64,
        pub kills: i32,
        pub deaths: i32,
        pub rank_position: i32,
    }

    #[derive(Debug, Clone, sqlx::FromRow)]
    pub struct ProfileRow {
        pub user_id: String,
        pub name: String,
        pub picture: Option<String>,
        pub level: i32,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AttendanceMonthly,
    MusicImpact,
    GamingRanked,
    HybridMaster,
}

impl Category {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "attendance_monthly" => Some(Category::AttendanceMonthly),
            "music_impact" => Some(Category::MusicImpact),
            "gaming_ranked" => Some(Category::GamingRanked),
            "hybrid_master" => Some(Category::HybridMaster),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::AttendanceMonthly => "attendance_monthly",
            Category::MusicImpact => "music_impact",
            Category::GamingRanked => "gaming_ranked",
            Category::HybridMaster => "hybrid_master",
        }
    }

    pub fn catalog() -> Vec<CategoryInfo> {
        vec![
            CategoryInfo {
                id: "attendance_monthly",
                name: "Attendance Champions",
                description: "Top members by monthly studio attendance",
                icon: "calendar",
                formula: "Total check-ins + (duration_hours * 2)",
            },
            // the advertised formula text for music and gaming predates the
            // current scoring and is kept as-is for client compatibility
            CategoryInfo {
                id: "music_impact",
                name: "Music Impact",
                description: "Members with highest music contributions",
                icon: "music",
                formula: "(tracks * 50) + (contributions * 30) + (listens/100)",
            },
            CategoryInfo {
                id: "gaming_ranked",
                name: "Gaming Elite",
                description: "Top gamers by score and wins",
                icon: "gamepad",
                formula: "(wins * 100) + (total_score/1000) + (kd_ratio * 50)",
            },
            CategoryInfo {
                id: "hybrid_master",
                name: "Hybrid Masters",
                description: "Members excelling across all activities",
                icon: "star",
                formula: "(attendance_score * 0.3) + (music_score * 0.35) + (gaming_score * 0.35)",
            },
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub formula: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Weekly,
    #[default]
    Monthly,
    Seasonal,
    AllTime,
}

impl Period {
    pub fn slug(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Seasonal => "seasonal",
            Period::AllTime => "all_time",
        }
    }

    /// Start of the lookback window. `AllTime` reaches back to the
    /// platform launch epoch rather than the actual beginning of time.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Weekly => now - Duration::days(7),
            Period::Monthly => now - Duration::days(30),
            Period::Seasonal => now - Duration::days(90),
            Period::AllTime => Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: String,
    pub name: String,
    pub picture: Option<String>,
    pub level: i32,
    pub score: f64,
    pub details: Value,
}

pub struct LeaderboardAggregator {
    pool: &'static Pool<Postgres>,
}

impl LeaderboardAggregator {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn compute(
        &self,
        category: Category,
        period: Period,
        limit: usize,
        now: DateTime<Utc>,
    ) -> SqlxResult<Vec<LeaderboardEntry>> {
        let repo = LeaderboardRepository::new(self.pool);

        // Only attendance applies the lookback window; the other boards
        // rank lifetime activity.
        let scored = match category {
            Category::AttendanceMonthly => {
                let rows = repo.attendance_since(period.window_start(now)).await?;
                formulas::attendance_impact(&rows)
            }

            Category::MusicImpact => {
                let (tracks, contributions) =
                    futures::try_join!(repo.track_rows(), repo.contribution_rows())?;
                formulas::music_impact(&tracks, &contributions)
            }

            Category::GamingRanked => {
                let rows = repo.score_rows().await?;
                formulas::gaming_ranked(&rows)
            }

            Category::HybridMaster => {
                let (attendance, tracks, contributions, scores) = futures::try_join!(
                    repo.attendance_since(Period::AllTime.window_start(now)),
                    repo.track_rows(),
                    repo.contribution_rows(),
                    repo.score_rows()
                )?;
                formulas::hybrid_master(&attendance, &tracks, &contributions, &scores)
            }
        };

        let ranked = formulas::rank(scored, limit);
        self.enrich(&repo, ranked).await
    }

    /// Attaches display name/picture/level from the user record at query
    /// time. A user deleted between aggregation and enrichment drops out
    /// here; ranks are assigned after the drop so they stay contiguous.
    async fn enrich(
        &self,
        repo: &LeaderboardRepository,
        ranked: Vec<formulas::ScoredUser>,
    ) -> SqlxResult<Vec<LeaderboardEntry>> {
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = ranked.iter().map(|s| s.user_id.clone()).collect();
        let profiles = repo.profiles_by_ids(&ids).await?;
        let by_id: HashMap<&str, &rows::ProfileRow> = profiles
            .iter()
            .map(|p| (p.user_id.as_str(), p))
            .collect();

        let entries = ranked
            .into_iter()
            .filter_map(|scored| {
                let profile = by_id.get(scored.user_id.as_str())?;
                Some((scored, (*profile).clone()))
            })
            .enumerate()
            .map(|(i, (scored, profile))| LeaderboardEntry {
                rank: i as i64 + 1,
                user_id: scored.user_id,
                name: profile.name,
                picture: profile.picture,
                level: profile.level,
                score: scored.score,
                details: scored.details,
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn category_slugs_round_trip() {
        for slug in [
            "attendance_monthly",
            "music_impact",
            "gaming_ranked",
            "hybrid_master",
        ] {
            let category = Category::from_slug(slug).unwrap();
            assert_eq!(category.slug(), slug);
        }

        assert!(Category::from_slug("chess_blitz").is_none());
    }

    #[test]
    fn period_windows_reach_back_the_right_distance() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();

        assert_eq!(now - Period::Weekly.window_start(now), Duration::days(7));
        assert_eq!(now - Period::Monthly.window_start(now), Duration::days(30));
        assert_eq!(now - Period::Seasonal.window_start(now), Duration::days(90));
        assert_eq!(
            Period::AllTime.window_start(now),
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn default_period_is_monthly() {
        assert_eq!(Period::default(), Period::Monthly);
    }
}
