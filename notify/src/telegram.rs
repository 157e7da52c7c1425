use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::NotifyError;
use crate::notifier::Notifier;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage` with Markdown formatting.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(api_url: String, token: String, chat_id: String) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    // The url carries the bot token, so it never goes into spans or errors.
    #[instrument(skip_all, fields(chat_id = %self.chat_id, len = text.len()), level = "debug")]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);

        let resp = self
            .http
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                parse_mode: "Markdown",
            })
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = resp.status();
        let body: Option<ApiResponse> = resp.json().await.ok();

        match body {
            Some(b) if b.ok && status.is_success() => {
                debug!("telegram message delivered");
                Ok(())
            }
            Some(b) => Err(NotifyError::Rejected(
                b.description.unwrap_or_else(|| format!("status {status}")),
            )),
            None => Err(NotifyError::Rejected(format!(
                "status {status}, unreadable response"
            ))),
        }
    }
}
