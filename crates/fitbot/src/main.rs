use std::sync::Arc;

use fitbot_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), fitbot_core::Error> {
    fitbot_core::logging::init("fitbot")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!(error = %e, "configuration is invalid");
            return Err(e);
        }
    };
    tracing::info!(
        mode = cfg.run_mode.as_str(),
        token_prefix = %cfg.token_prefix(),
        workout_log = %cfg.workout_log_path.display(),
        "starting fitbot"
    );

    fitbot_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| fitbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
