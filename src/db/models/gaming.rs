use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::user::{UserId, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Fps,
    Fighting,
    Racing,
    Sports,
    Strategy,
    BattleRoyale,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Fps => "fps",
            GameType::Fighting => "fighting",
            GameType::Racing => "racing",
            GameType::Sports => "sports",
            GameType::Strategy => "strategy",
            GameType::BattleRoyale => "battle_royale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GameMatch {
    pub match_id: String,
    pub title: String,
    pub game_type: String,
    pub game_name: String,
    pub participants: Vec<String>,
    pub winner_id: Option<String>,
    pub status: String,
    pub created_by: UserId,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MatchCreate {
    pub title: String,
    pub game_type: GameType,
    pub game_name: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Immutable per-(match, user) result row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GameScore {
    pub score_id: String,
    pub match_id: String,
    pub user_id: UserId,
    pub score: i64,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub rank_position: i32,
    pub xp_earned: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreSubmit {
    pub user_id: String,
    pub score: i64,
    #[serde(default)]
    pub kills: i32,
    #[serde(default)]
    pub deaths: i32,
    #[serde(default)]
    pub assists: i32,
    #[serde(default)]
    pub rank_position: i32,
}

#[derive(Debug, Serialize)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub game_match: GameMatch,
    pub participant_details: Vec<UserSummary>,
    pub scores: Vec<GameScore>,
}

#[derive(Debug, Serialize)]
pub struct MatchOutcome {
    pub success: bool,
    pub winner_id: Option<String>,
}
