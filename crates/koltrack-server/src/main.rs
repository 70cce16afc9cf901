mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use koltrack_engine::{RefreshQueue, ScrapeRefresher};
use koltrack_scraper::ScrapeClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(koltrack_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = koltrack_db::PoolConfig::from_app_config(&config);
    let pool = koltrack_db::connect_pool(&config.database_url, pool_config).await?;
    koltrack_db::run_migrations(&pool).await?;

    let scraper = Arc::new(ScrapeClient::new(
        &config.scraper_token,
        &config.scraper_actor,
        config.scraper_timeout_secs,
    )?);

    // Process-wide FIFO queue for single-post refreshes; in-memory, reset
    // on restart.
    let refresh_queue = RefreshQueue::start(ScrapeRefresher::new(
        pool.clone(),
        Arc::clone(&scraper),
    ));

    let _scheduler =
        scheduler::build_scheduler(pool.clone(), Arc::clone(&scraper), &config.refresh_schedule)
            .await?;

    let app = build_app(AppState {
        pool,
        scraper,
        refresh_queue,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "koltrack server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
