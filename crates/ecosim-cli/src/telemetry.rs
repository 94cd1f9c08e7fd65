//! Logging setup for the simulator binary.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// status lines and frames.
pub fn init_telemetry(verbose: bool, json: bool) -> Result<()> {
    let default_filter = if verbose {
        "debug,ecosim_world=debug"
    } else {
        "info,ecosim_world=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_target(true).with_writer(std::io::stderr)))
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
