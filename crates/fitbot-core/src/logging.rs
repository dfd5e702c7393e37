use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the bot.
///
/// Default: info everywhere, with our crates named explicitly. Can be
/// overridden with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::Config(format!("logging init failed: {e}")))?;

    tracing::info!(service = service_name, "logging initialized");
    Ok(())
}

fn default_directives(service_name: &str) -> String {
    format!(
        "info,fitbot=info,fitbot_core=info,fitbot_telegram=info,\
         fitbot_commands_api=info,{}=info",
        service_name.replace('-', "_")
    )
}
