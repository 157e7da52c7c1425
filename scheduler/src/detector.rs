//! Change detection.
//!
//! Compares this cycle's observed prices with the persisted baselines and
//! produces two lists of Markdown lines: alerts for instruments whose move
//! exceeded tolerance, and a digest line for every comparable instrument.
//!
//! An instrument is comparable when it has both a current price and a
//! baseline price. Anything else is skipped silently; a freshly added
//! instrument becomes comparable on the cycle after its first price has
//! been stored.

use std::collections::BTreeMap;

use baseline::{Baseline, Observation};
use tracing::info;

/// Which moves count as a breach of the accepted delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreachRule {
    /// `current - previous > accepted_delta`. Falls only breach when the
    /// accepted delta itself is negative.
    #[default]
    Rising,

    /// `|current - previous| > accepted_delta`.
    Symmetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

impl BreachRule {
    /// Returns the direction of a breaching move, `None` otherwise. A zero
    /// move never breaches.
    pub fn classify(self, raw_delta: f64, accepted_delta: f64) -> Option<Direction> {
        let breached = match self {
            BreachRule::Rising => raw_delta > accepted_delta,
            BreachRule::Symmetric => raw_delta.abs() > accepted_delta,
        };

        if !breached || raw_delta == 0.0 {
            return None;
        }
        if raw_delta > 0.0 {
            Some(Direction::Increased)
        } else {
            Some(Direction::Decreased)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub changed: Vec<String>,
    pub digest: Vec<String>,
}

/// Compares `current` against `baseline`. An unset accepted delta counts as
/// zero tolerance.
pub fn detect(
    current: &BTreeMap<String, Observation>,
    baseline: &BTreeMap<String, Baseline>,
    rule: BreachRule,
) -> Detection {
    let mut out = Detection::default();

    for (name, obs) in current {
        let Some(price_now) = obs.price else {
            continue;
        };
        let Some(price_before) = baseline.get(name).and_then(|b| b.last_price) else {
            continue;
        };

        let raw_delta = price_now - price_before;
        let tolerance = obs.accepted_delta.unwrap_or(0.0);

        match rule.classify(raw_delta, tolerance) {
            Some(direction) => out.changed.push(alert_line(
                name,
                direction,
                raw_delta,
                price_before,
                price_now,
            )),
            None => info!(
                instrument = %name,
                current = price_now,
                previous = price_before,
                delta = round2(raw_delta),
                accepted_delta = ?obs.accepted_delta,
                "within tolerance"
            ),
        }

        out.digest.push(digest_line(name, price_now));
    }

    out
}

pub fn alert_line(
    name: &str,
    direction: Direction,
    raw_delta: f64,
    previous: f64,
    current: f64,
) -> String {
    format!(
        "{} - {} by {}. Previous: {}. Current: {}. Delta: {}",
        bold(name),
        direction.label(),
        fmt_number(round2(raw_delta.abs())),
        fmt_number(previous),
        fmt_number(current),
        fmt_number(round2(raw_delta)),
    )
}

pub fn digest_line(name: &str, current: f64) -> String {
    format!(
        "{}: current price = {}.",
        escape_markdown(name),
        fmt_number(current)
    )
}

pub fn round2(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    // Avoid printing "-0.0".
    if r == 0.0 { 0.0 } else { r }
}

/// Whole numbers keep one decimal place (`100.0`); everything else uses
/// the shortest representation that round-trips.
pub fn fmt_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Bold entity for `name`. Escapes are not honoured inside an entity, so
/// the name goes in as is; a name containing `*` cannot be bolded and is
/// emitted as escaped plain text instead.
pub fn bold(name: &str) -> String {
    if name.contains('*') {
        escape_markdown(name)
    } else {
        format!("*{name}*")
    }
}

/// Escapes the characters legacy Telegram Markdown treats as markup outside
/// an entity.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
