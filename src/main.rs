use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use passenger_api::server::{self, AppState};

const DEFAULT_CONFIG_PATH: &'static str = "data_config.json";

#[derive(Parser, Debug)]
#[command(name = "passenger_api", about = "Serves the passenger manifest over HTTP")]
struct Args {
    /// Address the HTTP server binds to.
    #[arg(long, env = "PASSENGER_API_LISTEN", default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Data config file, re-read on every request.
    #[arg(long, env = "PASSENGER_API_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let ansi = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    tracing_subscriber::fmt()
        .with_ansi(ansi)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn".into()),
        )
        .init();

    let args = Args::parse();
    if !args.config.exists() {
        tracing::warn!(config = %args.config.display(), "data config not found; requests will fail until it exists");
    }
    server::start_server(AppState::new(args.config), args.listen).await
}
