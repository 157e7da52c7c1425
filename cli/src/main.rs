pub mod cli;
pub mod config;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use baseline::store::SqliteBaselineStore;
use cli::Cli;
use common::logger::init_logger;
use config::AppConfig;
use market::BinanceClient;
use notify::{Dispatcher, RetryPolicy, TelegramNotifier};
use scheduler::{CycleScheduler, JsonFileConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env(&cli)?;

    init_logger("tickwatch", &cfg.log_dir, cfg.json_logs);
    info!(config = ?cfg, "Starting tickwatch...");

    // One connection for the whole run; closed on every exit path below.
    let store = Arc::new(SqliteBaselineStore::new(&cfg.database_url).await?);

    let prices = Arc::new(BinanceClient::new(cfg.price_source_url.clone())?);

    let notifier = Arc::new(TelegramNotifier::new(
        cfg.telegram_api_url.clone(),
        cfg.telegram_token.clone(),
        cfg.telegram_chat_id.clone(),
    )?);
    let dispatcher = Dispatcher::new(notifier, RetryPolicy::default());

    let sources = Arc::new(JsonFileConfig::new(&cfg.tunables_path, &cfg.tickers_path));

    let scheduler = CycleScheduler::new(store.clone(), prices, dispatcher, sources)
        .with_log_dir(&cfg.log_dir);

    let result = tokio::select! {
        fatal = scheduler.run() => Err(anyhow::Error::new(fatal)),
        signal = tokio::signal::ctrl_c() => signal.map_err(anyhow::Error::from),
    };

    store.close().await;

    match result {
        Ok(()) => {
            info!("Shutdown signal received");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "monitor stopped");
            Err(e)
        }
    }
}
