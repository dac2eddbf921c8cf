use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nexusone_worker::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexusone_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = nexusone_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    nexusone_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!("Received SIGINT, stopping after the current job");
        signal_token.cancel();
    });

    nexusone_worker::run(pool, config, shutdown).await;
}
