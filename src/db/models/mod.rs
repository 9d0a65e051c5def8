use serde::{Deserialize, Serialize};

pub mod attendance;
pub mod badge;
pub mod events;
pub mod gaming;
pub mod season;
pub mod session;
pub mod track;
pub mod user;

#[inline]
const fn default_offset() -> i64 {
    0
}

#[inline]
const fn default_limit() -> i64 {
    20
}

/// Offset/limit pair shared by the listing endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_offset")]
    pub offset: i64,
}
