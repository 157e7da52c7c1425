//! Shared types used by the scheduler subsystem.

use std::time::Duration;

use crate::detector::BreachRule;

pub const DEFAULT_PAUSE: Duration = Duration::from_secs(30);
pub const DEFAULT_DIGEST_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);
pub const DEFAULT_HEARTBEAT_EVERY: u64 = 2000;

/// Log files are kept for this many days, today included.
pub const LOG_RETENTION_DAYS: u64 = 3;

pub const STARTUP_MESSAGE: &str = "Price monitor started!";
pub const HEARTBEAT_MESSAGE: &str = "Price monitor is running normally...";
pub const FATAL_MESSAGE: &str =
    "Failed to fetch current prices. The monitor needs attention and is shutting down!";

/// Knobs re-read from configuration at the start of every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    /// Base sleep between cycles, before jitter.
    pub pause: Duration,

    /// Minimum time between two digests when nothing breached.
    pub digest_interval: Duration,

    /// Heartbeat every N cycles. Zero disables it.
    pub heartbeat_every: u64,

    pub breach_rule: BreachRule,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pause: DEFAULT_PAUSE,
            digest_interval: DEFAULT_DIGEST_INTERVAL,
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            breach_rule: BreachRule::Rising,
        }
    }
}
