use thiserror::Error;

/// Every way a snapshot can be unavailable. None of these is fatal on its
/// own; the scheduler decides what to do with them.
#[derive(Error, Debug)]
pub enum PriceSourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from price source: {0}")]
    InvalidResponse(String),

    #[error("price source returned no quotes")]
    Empty,
}
