use market::PriceSourceError;
use thiserror::Error;

/// Conditions that end the monitoring loop.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("price source unavailable: {0}")]
    PriceSourceUnavailable(#[from] PriceSourceError),

    #[error("none of the {requested} configured instruments has a current price")]
    NoInstrumentPrices { requested: usize },
}
