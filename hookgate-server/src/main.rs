//! hookgate
//!
//! A webhook receiver that redeploys a host when its branch is pushed.

use clap::Parser;
use hookgate_server::config::ConfigLoader;
use hookgate_server::server::{build_router, run_server};
use hookgate_server::shutdown::spawn_config_reload_handler;
use hookgate_server::state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// hookgate - run an update script whenever a branch is pushed
#[derive(Parser, Debug)]
#[command(name = "hookgate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long, env = "HOOKGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Environment file read before the process environment; missing is fine
    #[arg(long, env = "HOOKGATE_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,

    /// Override the listen address (e.g., 127.0.0.1:9000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting hookgate v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(
        ConfigLoader::new(args.config.as_deref(), args.listen).with_dotenv(&args.env_file),
    );
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    match &args.config {
        Some(path) => tracing::info!("Configuration loaded from {:?} and environment", path),
        None => tracing::info!("Configuration loaded from environment"),
    }
    tracing::info!(
        branch = %loaded_config.webhook.branch,
        script = %loaded_config.update.script_path.display(),
        "Watching for pushes"
    );

    let state = AppState::new(loaded_config.into_shared());

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    let router = build_router(state);

    let result = run_server(router, listen_addr).await;

    shutdown_notify.notify_one();
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
