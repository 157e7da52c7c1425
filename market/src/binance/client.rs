use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::binance::types::{RawPrice, SymbolListEnvelope};
use crate::errors::PriceSourceError;
use crate::source::PriceSource;
use crate::types::{PriceQuote, PriceSnapshot};

pub const DEFAULT_SYMBOL_LIST_URL: &str =
    "https://www.binance.com/bapi/composite/v1/public/marketing/symbol/list";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/94.0.4606.81 Safari/537.36";

/// Public Binance symbol list. No authentication.
#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    url: String,
}

impl BinanceClient {
    pub fn new(url: String) -> Result<Self, PriceSourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_snapshot(&self) -> Result<PriceSnapshot, PriceSourceError> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let snapshot = parse_symbol_list(&body)?;

        debug!(quotes = snapshot.len(), "binance symbol list fetched");

        Ok(snapshot)
    }
}

/// Parses a symbol-list body into a snapshot.
///
/// Entries without a name are dropped. Entries with an unreadable price are
/// kept with `price: None` so that resolving them reports "no price" rather
/// than "unknown instrument".
pub fn parse_symbol_list(body: &str) -> Result<PriceSnapshot, PriceSourceError> {
    let envelope: SymbolListEnvelope = serde_json::from_str(body)
        .map_err(|e| PriceSourceError::InvalidResponse(e.to_string()))?;

    let entries = envelope
        .data
        .ok_or_else(|| PriceSourceError::InvalidResponse("missing `data` field".into()))?;

    let quotes: Vec<PriceQuote> = entries
        .into_iter()
        .filter_map(|e| {
            let price = e.price.as_ref().and_then(RawPrice::as_f64);
            e.name
                .filter(|n| !n.is_empty())
                .map(|name| PriceQuote { name, price })
        })
        .collect();

    if quotes.is_empty() {
        return Err(PriceSourceError::Empty);
    }

    Ok(PriceSnapshot::new(quotes))
}
