use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::warn;

use crate::configuration::DatabaseSettings;

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Builds the connection pool, retrying a bounded number of times so the
/// service survives a database that comes up slightly after it does.
pub async fn get_connection_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(settings.connect_options())
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < settings.max_connection_retries => {
                attempt += 1;
                warn!(
                    "database connection failed (attempt {attempt} of {}): {e}",
                    settings.max_connection_retries
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn migrate_database(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to run database migrations")
}
