use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsheet::api::{self, AppState};
use vsheet::config::Config;
use vsheet_core::Workspace;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let workspace = Workspace::open_dir(&config.data_dir)?;
    info!("Data directory: {}", config.data_dir.display());
    info!(
        "Files will be stored in: {}",
        Workspace::files_dir(&config.data_dir).display()
    );

    let state = AppState::new(workspace, config.service_name.clone());
    let app = api::app(state, &config.app_options());

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
