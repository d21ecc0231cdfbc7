use anyhow::Context;
use clap::Parser;
use clawcontrol_backend_lib::{
    auth::spawn_expiry_sweep, config::Settings, router::create_router, store::Db, AppState,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// ClawControl admin backend.
#[derive(Parser, Debug)]
#[command(name = "clawcontrold", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize configuration. A missing config.toml falls back to
    // defaults; a malformed one is a hard error.
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Settings::load().context("loading config.toml")?,
    };
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Open the document store
    let db = Db::open(&settings.data_dir)
        .await
        .context("opening document store")?;

    // Create application state and start session housekeeping
    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(db.clone(), settings));
    spawn_expiry_sweep(db);

    // Build the router and serve
    let app = create_router(state);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
