use thiserror::Error;

use crate::db::PgError;

mod api;
mod db;
mod gamification;
mod leaderboard;
mod recorder;
mod util;

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Pg(#[from] PgError),

    #[error(transparent)]
    Route(#[from] api::server::RouteError),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    util::telemetry::init();

    tracing::info!("starting main application");

    let pool = db::db_pool().await?;
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(PgError::from)?;

    api::server::serve().await?;

    Ok(())
}
