use powerhr_desk::configuration::get_configuration;
use powerhr_desk::database::{get_connection_pool, migrate_database};
use powerhr_desk::server::config::configure_app;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let configuration = get_configuration()?;
    let pool = get_connection_pool(&configuration.database).await?;
    migrate_database(&pool).await?;

    let app = configure_app(pool);

    let addr: SocketAddr = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    )
    .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("support desk listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
