use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::io::BufReader;
use transparent_desktop_lib::app::{AppBootstrap, HostAdapters};
use transparent_desktop_lib::channel;
use transparent_desktop_lib::logging::init_tracing;
use transparent_infrastructure::TransparentPaths;
use transparent_infrastructure::storage::API_KEY_ENV;

#[tokio::main]
async fn main() -> Result<()> {
    let paths = TransparentPaths::new(None).map_err(|e| anyhow!("{}", e))?;
    let _guard = init_tracing(&paths.logs_dir())?;

    tracing::info!("Starting transparent-desktop {}", env!("CARGO_PKG_VERSION"));

    let config = AppBootstrap::load_config(&paths)?;
    let host = HostAdapters::from_config(&config)?;
    let bootstrap = AppBootstrap::initialize(&paths, config, std::env::var(API_KEY_ENV).ok(), host)?;

    let state = Arc::new(bootstrap.app_state);
    channel::serve(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    Ok(())
}
