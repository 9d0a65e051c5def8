use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::instrument;

/// Ranked entries go stale quickly anyway; a short TTL keeps the cache a
/// pure recomputation shortcut rather than a source of truth.
pub const SNAPSHOT_TTL_SECS: u64 = 60;

pub fn snapshot_key(category: &str, period: &str, limit: i64) -> String {
    format!("leaderboard:{category}:{period}:{limit}")
}

/// Best-effort read; any redis failure is logged and treated as a miss.
#[instrument(skip(manager))]
pub async fn fetch(manager: &mut ConnectionManager, key: &str) -> Option<String> {
    match manager.get::<_, Option<String>>(key).await {
        Ok(cached) => cached,
        Err(e) => {
            tracing::warn!(error = ?e, key, "leaderboard snapshot read failed");
            None
        }
    }
}

/// Best-effort write; failure never reaches the caller.
#[instrument(skip(manager, payload))]
pub async fn store(manager: &mut ConnectionManager, key: &str, payload: &str) {
    if let Err(e) = manager
        .set_ex::<_, _, ()>(key, payload, SNAPSHOT_TTL_SECS)
        .await
    {
        tracing::warn!(error = ?e, key, "leaderboard snapshot write failed");
    }
}
