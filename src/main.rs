// Native messaging host for the web clipper extension.
//
// The browser starts this binary and exchanges length-prefixed JSON over
// stdin/stdout, so all logging goes to stderr.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use kodegen_tools_clipper::NativeHost;
use kodegen_tools_clipper::utils::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME};

fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::config_dir().context("no platform config directory, set CLIPPER_CONFIG_DIR")?;
    Ok(base.join(CONFIG_DIR_NAME))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let config_dir = config_dir()?;
    tracing::info!(config_dir = %config_dir.display(), "clipper host starting");

    let host = NativeHost::open(&config_dir).context("failed to set up clipper host")?;
    if let Err(e) = host.initialize().await {
        tracing::warn!("Initialization incomplete: {e}");
    }

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    host.serve(&mut stdin, &mut stdout)
        .await
        .context("native messaging connection failed")?;

    Ok(())
}
