//! Sign API Server Binary
//!
//! This binary starts the HTTP service that classifies hand landmarks into
//! sign language letters.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (0.0.0.0:5000, model/ next to the working directory)
//! sign-api
//!
//! # Specify port, config file and model resources
//! PORT=8080 sign-api --config ./config.toml \
//!     --model ./slr/model.safetensors --labels ./slr/label.csv
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sign_api::config::{resolve_path, Config};
use sign_api::web::{self, AppState};

/// Sign API Server - classifies hand landmarks into letters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Config file. Defaults to the platform-specific config directory:
    /// - Linux: ~/.config/SignApi/config.toml
    /// - macOS: ~/Library/Application Support/SignApi/config.toml
    /// - Windows: %APPDATA%\SignApi\config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model weights (safetensors)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Label table (CSV, one label per row)
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Class index that means "no confident class"
    #[arg(long)]
    reserved_index: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Loads the config and the directory its relative model paths resolve against.
fn load_config(path: Option<&Path>, current_dir: &Path) -> anyhow::Result<(Config, PathBuf)> {
    match path {
        Some(path) => {
            let config = Config::load_from(path)?;
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| current_dir.to_path_buf(), Path::to_path_buf);
            Ok((config, base))
        }
        None => Ok((Config::load()?, current_dir.to_path_buf())),
    }
}

/// Applies command line values on top of the file config.
///
/// File paths resolve against `base_dir`, paths given on the command line
/// against `current_dir`.
fn apply_overrides(
    mut config: Config,
    args: &Args,
    base_dir: &Path,
    current_dir: &Path,
) -> Config {
    config.model = config.model.resolve_paths(base_dir);

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(model) = &args.model {
        config.model.model_path = resolve_path(model, current_dir);
    }
    if let Some(labels) = &args.labels {
        config.model.label_path = resolve_path(labels, current_dir);
    }
    if args.reserved_index.is_some() {
        config.model.reserved_index = args.reserved_index;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let current_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let (config, base_dir) = load_config(args.config.as_deref(), &current_dir)?;
    let config = apply_overrides(config, &args, &base_dir, &current_dir);
    config.validate()?;

    let state = AppState::load(&config.model);
    if !state.classifier().is_ready() {
        info!("Serving without a model; /classify-sign will return errors");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid host/port")?;

    web::run_server(state, addr).await
}
