//! bmc-rpc — HTTP power control for PoE-powered bare-metal machines.
//!
//! Serves `POST /rpc` and `GET /maaspower/{mac}/{port}/query` backed by a
//! UniFi controller.

use std::path::{Path, PathBuf};

use anyhow::Result;
use bmc_rpc::{AppState, BmcConfig, router};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "config.yaml";

/// bmc-rpc — BMC-style RPC endpoint driving switch PoE ports.
#[derive(Parser)]
#[command(
    name = "bmc-rpc",
    version,
    about = "BMC-style RPC endpoint driving switch PoE ports"
)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0")]
    address: String,
    /// Configuration YAML file [default: ./config.yaml or ~/.config/bmc-rpc/config.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity; info by default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    // Ctrl-C handler — cancels the root token for graceful shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutting down bmc-rpc...");
        cancel_for_signal.cancel();
    });

    let config_path = resolve_config(cli.config)?;
    run_serve(config_path, cli.address, cli.port, cancel).await
}

/// Load config, build the controller-backed router, and serve until cancelled.
async fn run_serve(
    config_path: PathBuf,
    address: String,
    port: u16,
    cancel: CancellationToken,
) -> Result<()> {
    let config = BmcConfig::from_file(&config_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    tracing::info!(
        config = %config_path.display(),
        controller = %config.api_endpoint,
        site = %config.site,
        machines = config.machines.len(),
        "configuration loaded"
    );

    let state = AppState::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build controller client: {}", e))?;
    let app = router(state);

    let addr = format!("{}:{}", address, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!(address = %address, port = %port, "Server is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| anyhow::anyhow!("bmc-rpc HTTP server error: {}", e))?;

    tracing::info!("bmc-rpc HTTP server stopped");
    Ok(())
}

/// Resolve config file path: explicit flag → ./config.yaml → ~/.config/bmc-rpc/config.yaml.
fn resolve_config(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let local = Path::new(CONFIG_FILE);
    if local.exists() {
        return Ok(local.to_path_buf());
    }

    if let Some(config_dir) = dirs::config_dir() {
        let xdg = config_dir.join("bmc-rpc").join(CONFIG_FILE);
        if xdg.exists() {
            return Ok(xdg);
        }
    }

    Err(anyhow::anyhow!(
        "No config.yaml found. Searched ./config.yaml and ~/.config/bmc-rpc/config.yaml. \
         Use -c to specify a path."
    ))
}
