use clap::Parser;
use devin_bridge::core::config::Config;
use devin_bridge::server::{create_router, AppState};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "devin-bridge")]
#[command(about = "Bridges the Devin agent API into an MCP streamable-HTTP endpoint")]
#[command(long_about = "devin-bridge serves two routes: POST /api/mcp/devin, a stateless \
streamable-HTTP MCP endpoint exposing the Devin session tools, and \
GET /api/mcp/devin-status, which reports whether the upstream credential is \
configured.\n\n\
Environment Variables:\n\
  DEVIN_API_KEY     Bearer credential for the Devin API (required to serve tools)\n\
  DEVIN_BASE_URL    Override for the upstream base URL (optional)\n\
  RUST_LOG          Log filter, e.g. devin_bridge=debug")]
struct Args {
    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to an alternate config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "devin_bridge=debug,tower_http=debug".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::load_from_path(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::load()?,
    };
    if args.bind.is_some() {
        config.bind = args.bind.clone();
    }

    if config.api_key().is_none() {
        info!("DEVIN_API_KEY is not configured; the MCP endpoint will refuse tool requests");
    }

    let bind = config.bind_addr().to_string();
    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %bind, "devin-bridge listening");
    axum::serve(listener, app).await?;
    Ok(())
}
