use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "tickwatch", version, about = "Watches instrument prices and reports moves over tolerance")]
pub struct Cli {
    /// Instrument list: JSON object of name -> {"delta_accept": <number>}
    #[clap(long, default_value = "tickers.json")]
    pub tickers: PathBuf,

    /// Tunables: PAUSE_CYCLE, TIME_ONLY_PRICE, COUNTER_SEND, SYMMETRIC_ALERTS
    #[clap(long, default_value = "config.json")]
    pub tunables: PathBuf,

    /// Overrides DATABASE_URL
    #[clap(long)]
    pub database_url: Option<String>,

    /// Overrides LOG_DIR
    #[clap(long)]
    pub log_dir: Option<PathBuf>,
}
