use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::user::{UserId, UserSummary};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Track {
    pub track_id: String,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub duration_seconds: i32,
    pub cover_image: Option<String>,
    pub audio_url: Option<String>,
    pub created_by: UserId,
    pub contributors: Vec<String>,
    pub listens: i64,
    pub likes: i64,
    pub shares: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TrackCreate {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub duration_seconds: i32,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionType {
    Vocals,
    Beat,
    Mix,
    Master,
    Instrument,
    Writing,
    Production,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::Vocals => "vocals",
            ContributionType::Beat => "beat",
            ContributionType::Mix => "mix",
            ContributionType::Master => "master",
            ContributionType::Instrument => "instrument",
            ContributionType::Writing => "writing",
            ContributionType::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrackContribution {
    pub contribution_id: String,
    pub track_id: String,
    pub user_id: UserId,
    pub contribution_type: String,
    pub notes: Option<String>,
    pub xp_earned: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ContributionCreate {
    pub contribution_type: ContributionType,
    pub notes: Option<String>,
}

/// Track plus its contribution breakdown for list/detail responses.
#[derive(Debug, Serialize)]
pub struct TrackDetail {
    #[serde(flatten)]
    pub track: Track,
    pub contributions: Vec<TrackContribution>,
    pub contributor_details: Vec<UserSummary>,
}
