pub mod client;
pub mod types;

pub use client::{BinanceClient, DEFAULT_SYMBOL_LIST_URL, parse_symbol_list};
pub use types::*;
