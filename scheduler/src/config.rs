//! Per-cycle configuration: tunables and the desired instrument set.
//!
//! Both are re-read at the start of every cycle so edits take effect
//! without a restart.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use baseline::DesiredSet;
use baseline::model::normalize_delta;
use serde_json::{Map, Value};
use tracing::warn;

use crate::detector::BreachRule;
use crate::types::Tunables;

#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load_tunables(&self) -> anyhow::Result<Tunables>;

    async fn load_instruments(&self) -> anyhow::Result<DesiredSet>;
}

/// Reads both inputs from JSON files on disk.
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    tunables_path: PathBuf,
    instruments_path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(tunables_path: impl Into<PathBuf>, instruments_path: impl Into<PathBuf>) -> Self {
        Self {
            tunables_path: tunables_path.into(),
            instruments_path: instruments_path.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for JsonFileConfig {
    async fn load_tunables(&self) -> anyhow::Result<Tunables> {
        let raw = tokio::fs::read_to_string(&self.tunables_path)
            .await
            .with_context(|| format!("failed to read {}", self.tunables_path.display()))?;
        parse_tunables(&raw)
    }

    async fn load_instruments(&self) -> anyhow::Result<DesiredSet> {
        let raw = tokio::fs::read_to_string(&self.instruments_path)
            .await
            .with_context(|| format!("failed to read {}", self.instruments_path.display()))?;
        parse_instruments(&raw)
    }
}

/// Parses the tunables object. Every key is optional; a missing key or a
/// value of the wrong shape falls back to that key's default.
///
/// ```json
/// { "PAUSE_CYCLE": 30, "TIME_ONLY_PRICE": 14400, "COUNTER_SEND": 2000, "SYMMETRIC_ALERTS": false }
/// ```
pub fn parse_tunables(raw: &str) -> anyhow::Result<Tunables> {
    let obj: Map<String, Value> =
        serde_json::from_str(raw).context("tunables file is not a JSON object")?;
    let defaults = Tunables::default();

    Ok(Tunables {
        pause: seconds(&obj, "PAUSE_CYCLE").unwrap_or(defaults.pause),
        digest_interval: seconds(&obj, "TIME_ONLY_PRICE").unwrap_or(defaults.digest_interval),
        heartbeat_every: field(&obj, "COUNTER_SEND", Value::as_u64)
            .unwrap_or(defaults.heartbeat_every),
        breach_rule: match field(&obj, "SYMMETRIC_ALERTS", Value::as_bool) {
            Some(true) => BreachRule::Symmetric,
            Some(false) => BreachRule::Rising,
            None => defaults.breach_rule,
        },
    })
}

fn field<T>(obj: &Map<String, Value>, key: &str, read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = obj.get(key)?;
    let parsed = read(value);
    if parsed.is_none() {
        warn!(key, value = %value, "invalid tunable value; using default");
    }
    parsed
}

fn seconds(obj: &Map<String, Value>, key: &str) -> Option<Duration> {
    field(obj, key, |v| {
        v.as_f64()
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    })
}

/// Parses the instrument list: an object mapping instrument name to either
/// `{ "delta_accept": <number|string> }` or a bare tolerance value.
pub fn parse_instruments(raw: &str) -> anyhow::Result<DesiredSet> {
    let obj: Map<String, Value> =
        serde_json::from_str(raw).context("instrument file is not a JSON object")?;

    let mut out = DesiredSet::new();
    for (name, entry) in obj {
        if name.trim().is_empty() {
            return Err(anyhow!("instrument file contains an empty name"));
        }

        let delta = match &entry {
            Value::Object(fields) => fields
                .get("delta_accept")
                .or_else(|| fields.get("accepted_delta"))
                .and_then(normalize_delta),
            other => normalize_delta(other),
        };
        out.insert(name, delta);
    }

    Ok(out)
}
