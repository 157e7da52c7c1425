pub mod binance;
pub mod errors;
pub mod source;
pub mod types;

pub use binance::BinanceClient;
pub use errors::PriceSourceError;
pub use source::PriceSource;
pub use types::{PriceQuote, PriceSnapshot};
