mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(fakescan_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting fakescan server");

    let pool_config = fakescan_db::PoolConfig::from_app_config(&config);
    let pool = fakescan_db::connect_pool(&config.database_url, pool_config).await?;
    fakescan_db::run_migrations(&pool).await?;

    let training_config = Arc::clone(&config);
    let classifier =
        tokio::task::spawn_blocking(move || fakescan_pipeline::train_classifier(&training_config))
            .await
            .context("training task panicked")?
            .context("failed to train classifier")?;

    let analyzer = fakescan_pipeline::build_analyzer(&config, pool.clone(), Arc::new(classifier))?;
    let app = build_app(AppState {
        pool,
        analyzer: Arc::new(analyzer),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
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
