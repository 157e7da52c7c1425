use std::fmt;
use std::path::PathBuf;

use anyhow::Context;

use crate::cli::Cli;

/// Process-level settings. Everything that may change while running lives
/// in the tunables file instead.
#[derive(Clone)]
pub struct AppConfig {
    /// SQLite connection string for the baseline table.
    pub database_url: String,

    pub telegram_api_url: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,

    /// Full URL of the symbol-list endpoint.
    pub price_source_url: String,

    /// Daily log files are written here and pruned on heartbeat.
    pub log_dir: PathBuf,

    /// JSON log lines on stdout (APP_ENV=production).
    pub json_logs: bool,

    pub tickers_path: PathBuf,
    pub tunables_path: PathBuf,
}

impl AppConfig {
    pub fn from_env(cli: &Cli) -> anyhow::Result<Self> {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(cli: &Cli, get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = cli
            .database_url
            .clone()
            .unwrap_or_else(|| or("DATABASE_URL", "sqlite://stocks.db"));

        let log_dir = cli
            .log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(or("LOG_DIR", "logs")));

        Ok(Self {
            database_url,
            telegram_api_url: or("TELEGRAM_API_URL", notify::telegram::DEFAULT_API_URL),
            telegram_token: get("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?,
            telegram_chat_id: get("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID must be set")?,
            price_source_url: or(
                "PRICE_SOURCE_URL",
                market::binance::DEFAULT_SYMBOL_LIST_URL,
            ),
            log_dir,
            json_logs: get("APP_ENV").as_deref() == Some("production"),
            tickers_path: cli.tickers.clone(),
            tunables_path: cli.tunables.clone(),
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("price_source_url", &self.price_source_url)
            .field("log_dir", &self.log_dir)
            .field("json_logs", &self.json_logs)
            .field("tickers_path", &self.tickers_path)
            .field("tunables_path", &self.tunables_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_with_required_secrets() {
        let cli = Cli::try_parse_from(["tickwatch"]).unwrap();
        let vars = env(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "-42")]);

        let cfg = AppConfig::from_lookup(&cli, |k| vars.get(k).cloned()).unwrap();

        assert_eq!(cfg.database_url, "sqlite://stocks.db");
        assert_eq!(cfg.log_dir, PathBuf::from("logs"));
        assert_eq!(cfg.telegram_chat_id, "-42");
        assert_eq!(cfg.price_source_url, market::binance::DEFAULT_SYMBOL_LIST_URL);
        assert!(!cfg.json_logs);
    }

    #[test]
    fn missing_token_is_an_error() {
        let cli = Cli::try_parse_from(["tickwatch"]).unwrap();
        let vars = env(&[("TELEGRAM_CHAT_ID", "-42")]);

        let err = AppConfig::from_lookup(&cli, |k| vars.get(k).cloned()).unwrap_err();

        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn cli_flags_win_over_environment() {
        let cli = Cli::try_parse_from(["tickwatch", "--database-url", "sqlite://cli.db"]).unwrap();
        let vars = env(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "c"),
            ("DATABASE_URL", "sqlite://env.db"),
            ("APP_ENV", "production"),
        ]);

        let cfg = AppConfig::from_lookup(&cli, |k| vars.get(k).cloned()).unwrap();

        assert_eq!(cfg.database_url, "sqlite://cli.db");
        assert!(cfg.json_logs);
    }

    #[test]
    fn debug_output_hides_token() {
        let cli = Cli::try_parse_from(["tickwatch"]).unwrap();
        let vars = env(&[("TELEGRAM_BOT_TOKEN", "secret-token"), ("TELEGRAM_CHAT_ID", "c")]);

        let cfg = AppConfig::from_lookup(&cli, |k| vars.get(k).cloned()).unwrap();

        assert!(!format!("{cfg:?}").contains("secret-token"));
    }
}
