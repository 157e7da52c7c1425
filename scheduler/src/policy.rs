//! Cadence decisions: when to send a heartbeat, when a digest is due, and
//! how long to sleep between cycles.

use std::time::Duration;

use rand::Rng;

/// Heartbeat fires on every `every`-th cycle (cycles count from 1).
pub fn heartbeat_due(cycle: u64, every: u64) -> bool {
    every > 0 && cycle > 0 && cycle % every == 0
}

pub fn digest_due(since_last: Duration, interval: Duration) -> bool {
    since_last >= interval
}

/// `pause` scaled by a uniform factor in [0.8, 1.2]. A product that does
/// not fit in a `Duration` leaves the pause unjittered.
pub fn jittered_pause<R: Rng + ?Sized>(pause: Duration, rng: &mut R) -> Duration {
    if pause.is_zero() {
        return Duration::ZERO;
    }
    let factor: f64 = rng.gen_range(0.8..=1.2);
    Duration::try_from_secs_f64(pause.as_secs_f64() * factor).unwrap_or(pause)
}
