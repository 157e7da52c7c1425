//! Mutable state carried from one cycle to the next.

use baseline::DesiredSet;
use tokio::time::Instant;

use crate::types::Tunables;

#[derive(Debug)]
pub struct CycleState {
    /// Number of the cycle currently running, or last run. Starts at 0
    /// before the first cycle.
    pub cycle: u64,

    /// When the last digest went out; boot time until the first one.
    pub last_digest: Instant,

    /// Last successfully loaded instrument list, kept when a reload fails.
    pub desired: Option<DesiredSet>,

    pub tunables: Tunables,
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            cycle: 0,
            last_digest: Instant::now(),
            desired: None,
            tunables: Tunables::default(),
        }
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}
