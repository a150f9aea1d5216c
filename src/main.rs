//! Admiral - a terminal admin console for compute-cluster managers
//!
//! This is the binary entry point. All logic lives in the workspace
//! crates: admiral-core (domain types), admiral-client (API client),
//! admiral-app (state and orchestration), admiral-tui (rendering).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use admiral_app::config;
use admiral_app::Engine;
use admiral_client::{Credentials, HttpClusterApi};
use admiral_core::prelude::*;

/// Admiral - a terminal admin console for compute-cluster managers
#[derive(Parser, Debug)]
#[command(name = "admiral")]
#[command(about = "A terminal admin console for compute-cluster managers", long_about = None)]
struct Args {
    /// Cluster manager endpoint (overrides the config file)
    #[arg(value_name = "ENDPOINT")]
    endpoint: Option<String>,

    /// Path to an alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API access key (overrides the config file)
    #[arg(long, env = "ADMIRAL_ACCESS_KEY")]
    access_key: Option<String>,

    /// API secret key (overrides the config file)
    #[arg(long, env = "ADMIRAL_SECRET_KEY")]
    secret_key: Option<String>,

    /// Show user ids and access keys unmasked for this run
    #[arg(long)]
    no_mask: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;

    // Initialize logging (to file, since the TUI owns stdout)
    admiral_core::logging::init()?;

    let args = Args::parse();

    // Seed a commented config on first run, then load it
    config::init_config_dir(args.config.as_deref())?;
    let mut settings = config::load_settings(args.config.as_deref());

    if let Some(endpoint) = args.endpoint {
        settings.connection.endpoint = endpoint;
    }
    if let Some(access_key) = args.access_key {
        settings.connection.access_key = access_key;
    }
    if let Some(secret_key) = args.secret_key {
        settings.connection.secret_key = secret_key;
    }
    if args.no_mask {
        settings.ui.mask_sensitive = false;
    }

    info!("Admiral starting");
    info!("Endpoint: {}", settings.connection.endpoint);

    let client = HttpClusterApi::new(
        &settings.connection.endpoint,
        Credentials {
            access_key: settings.connection.access_key.clone(),
            secret_key: settings.connection.secret_key.clone(),
        },
    )?;

    let engine = Engine::new(Arc::new(client), settings, args.config);
    let result = admiral_tui::run(engine).await;

    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
    }

    info!("Admiral exiting");
    result
}
