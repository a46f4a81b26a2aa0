use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use switchboard::config::{self, CliArgs};
use switchboard::{create_app, db, logging, run_migrations, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = config::get_config(args);
    let _log_guard = logging::init_logging(&config, debug);

    let pool = db::init_pool(&config.database_url)
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;
    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        run_migrations(&mut conn)?;
    }

    let state = AppState::from_config(Arc::new(pool), &config);
    if !state.notifier.is_enabled() {
        warn!("Emergency alerts are disabled: set an email API key and at least one recipient");
    }
    let app = create_app(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
