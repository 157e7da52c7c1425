use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

/// Instrument name → desired accepted delta, as loaded from configuration.
pub type DesiredSet = BTreeMap<String, Option<f64>>;

/// Persisted comparison point for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub name: String,

    /// Tolerance; movements at or below it are not alert-worthy.
    /// `None` means no tolerance was configured.
    pub accepted_delta: Option<f64>,

    /// `None` until the first observed price has been persisted.
    pub last_price: Option<f64>,

    pub last_update: Option<DateTime<Utc>>,
}

/// What is known about an instrument in the current cycle.
///
/// The pre-fetch reconciliation pass carries only the tolerance; the
/// post-fetch pass also carries the observed price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub accepted_delta: Option<f64>,
    pub price: Option<f64>,
}

impl Observation {
    pub fn tolerance_only(accepted_delta: Option<f64>) -> Self {
        Self {
            accepted_delta,
            price: None,
        }
    }

    pub fn priced(accepted_delta: Option<f64>, price: f64) -> Self {
        Self {
            accepted_delta,
            price: Some(price),
        }
    }
}

/// Observations for the pre-fetch pass: every desired instrument with its
/// tolerance and no price.
pub fn desired_observations(desired: &DesiredSet) -> BTreeMap<String, Observation> {
    desired
        .iter()
        .map(|(name, delta)| (name.clone(), Observation::tolerance_only(*delta)))
        .collect()
}

/// Normalizes a configured tolerance to a float.
///
/// Numbers and numeric strings are accepted. Null, empty strings and
/// anything non-numeric or non-finite become `None`.
pub fn normalize_delta(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    warn!(value = %s, "accepted delta is not a number; treating as unset");
                    None
                }
            }
        }
        other => {
            warn!(value = %other, "accepted delta is not a number; treating as unset");
            None
        }
    }
}
