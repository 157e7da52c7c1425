//! The monitoring loop.
//!
//! Each cycle:
//!   1. Reloads tunables and the instrument list.
//!   2. Registers new instruments / tolerance edits (pre-pass).
//!   3. Sends the heartbeat (and prunes old logs) every N cycles.
//!   4. Fetches prices and compares them with the stored baselines.
//!   5. Persists the observed prices as the next baselines (post-pass).
//!   6. Sends alerts, or the digest when it is due, or nothing.
//!
//! Cycles never overlap: every step is awaited before the next starts.
//! The only way out of [`CycleScheduler::run`] is a price fetch that
//! yields nothing usable, which is escalated and returned.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use baseline::model::desired_observations;
use baseline::{BaselineStore, DesiredSet, Observation, reconcile};
use common::logger::{TraceId, cycle_span, prune_old_logs};
use market::{PriceSnapshot, PriceSource};
use notify::Dispatcher;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, warn};

use crate::config::ConfigSource;
use crate::detector::detect;
use crate::errors::SchedulerError;
use crate::policy::{digest_due, heartbeat_due, jittered_pause};
use crate::state::CycleState;
use crate::types::{FATAL_MESSAGE, HEARTBEAT_MESSAGE, LOG_RETENTION_DAYS, STARTUP_MESSAGE, Tunables};

/// What a completed cycle ended up sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Alert lines were dispatched.
    Alerted(usize),
    /// The periodic digest was dispatched.
    Digest(usize),
    /// Compared, nothing to send.
    Quiet,
    /// No instrument list or no baseline snapshot; nothing compared.
    Skipped,
}

pub struct CycleScheduler {
    store: Arc<dyn BaselineStore>,
    prices: Arc<dyn PriceSource>,
    dispatcher: Dispatcher,
    config: Arc<dyn ConfigSource>,

    /// Directory pruned on heartbeat cycles. `None` disables pruning.
    log_dir: Option<PathBuf>,

    state: CycleState,
    rng: StdRng,
}

impl CycleScheduler {
    pub fn new(
        store: Arc<dyn BaselineStore>,
        prices: Arc<dyn PriceSource>,
        dispatcher: Dispatcher,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self {
            store,
            prices,
            dispatcher,
            config,
            log_dir: None,
            state: CycleState::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn cycle(&self) -> u64 {
        self.state.cycle
    }

    pub fn tunables(&self) -> Tunables {
        self.state.tunables
    }

    /// Announces the start, then runs cycles until a fatal condition.
    pub async fn run(mut self) -> SchedulerError {
        info!("monitor starting");
        self.deliver("startup", STARTUP_MESSAGE).await;

        loop {
            if let Err(e) = self.run_cycle().await {
                return e;
            }

            let pause = jittered_pause(self.state.tunables.pause, &mut self.rng);
            debug!(pause_ms = pause.as_millis() as u64, "sleeping before next cycle");
            tokio::time::sleep(pause).await;
        }
    }

    /// Runs one full cycle. `Err` means the escalation has been sent and
    /// the monitor must stop.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, SchedulerError> {
        self.state.cycle += 1;
        let span = cycle_span(self.state.cycle, &TraceId::new());
        self.cycle_inner().instrument(span).await
    }

    async fn cycle_inner(&mut self) -> Result<CycleOutcome, SchedulerError> {
        let cycle = self.state.cycle;
        info!("starting price check cycle");

        self.reload().await;
        let tunables = self.state.tunables;
        let desired = self.state.desired.clone().filter(|d| !d.is_empty());

        if let Some(desired) = &desired {
            if let Err(e) = reconcile(self.store.as_ref(), &desired_observations(desired)).await {
                error!(error = ?e, "pre-fetch reconciliation failed");
            }
        }

        if heartbeat_due(cycle, tunables.heartbeat_every) {
            self.heartbeat().await;
        }

        let Some(desired) = desired else {
            if self.state.desired.is_some() {
                error!("instrument list is empty; nothing to monitor");
            } else {
                warn!("no instruments configured; skipping comparison");
            }
            return Ok(CycleOutcome::Skipped);
        };

        let snapshot = match self.prices.fetch_snapshot().await {
            Ok(s) => s,
            Err(e) => return Err(self.escalate(e.into()).await),
        };

        let current = observe(&snapshot, &desired);
        if current.is_empty() {
            return Err(self
                .escalate(SchedulerError::NoInstrumentPrices {
                    requested: desired.len(),
                })
                .await);
        }

        let baseline = match self.store.get_all().await {
            Ok(b) => b,
            Err(e) => {
                error!(error = ?e, "failed to read baselines; skipping comparison");
                return Ok(CycleOutcome::Skipped);
            }
        };

        let detection = detect(&current, &baseline, tunables.breach_rule);

        match reconcile(self.store.as_ref(), &current).await {
            Ok(report) => debug!(
                inserted = report.inserted,
                updated = report.updated,
                failed = report.failed,
                "baselines persisted"
            ),
            Err(e) => error!(error = ?e, "post-fetch reconciliation failed"),
        }

        if !detection.changed.is_empty() {
            let count = detection.changed.len();
            info!(count, "price changes over tolerance");
            self.deliver("alert", &detection.changed.join("\n")).await;
            return Ok(CycleOutcome::Alerted(count));
        }

        if digest_due(self.state.last_digest.elapsed(), tunables.digest_interval)
            && !detection.digest.is_empty()
        {
            let count = detection.digest.len();
            self.deliver("digest", &detection.digest.join("\n")).await;
            self.state.last_digest = Instant::now();
            return Ok(CycleOutcome::Digest(count));
        }

        info!("no notifications to send");
        Ok(CycleOutcome::Quiet)
    }

    async fn reload(&mut self) {
        self.state.tunables = match self.config.load_tunables().await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "failed to load tunables; using defaults");
                Tunables::default()
            }
        };

        match self.config.load_instruments().await {
            Ok(set) => self.state.desired = Some(set),
            Err(e) => warn!(
                error = %e,
                keeping_previous = self.state.desired.is_some(),
                "failed to load instrument list"
            ),
        }
    }

    async fn heartbeat(&self) {
        if let Some(dir) = &self.log_dir {
            match prune_old_logs(dir, LOG_RETENTION_DAYS) {
                Ok(removed) => debug!(removed, "old log files pruned"),
                Err(e) => warn!(error = %e, dir = %dir.display(), "failed to prune log files"),
            }
        }
        self.deliver("heartbeat", HEARTBEAT_MESSAGE).await;
    }

    async fn escalate(&self, err: SchedulerError) -> SchedulerError {
        error!(error = %err, "no usable prices; escalating and shutting down");
        self.deliver("escalation", FATAL_MESSAGE).await;
        err
    }

    /// Failures are already logged per attempt by the dispatcher; the loop
    /// carries on regardless.
    async fn deliver(&self, kind: &'static str, text: &str) {
        if let Err(e) = self.dispatcher.send(text).await {
            error!(kind, error = %e, "notification dropped");
        }
    }
}

/// Current prices for the desired instruments, with their configured
/// tolerance. Instruments missing from the snapshot are left out.
pub fn observe(snapshot: &PriceSnapshot, desired: &DesiredSet) -> BTreeMap<String, Observation> {
    let mut out = BTreeMap::new();

    for (name, delta) in desired {
        match snapshot.resolve(name) {
            Some(price) => {
                out.insert(name.clone(), Observation::priced(*delta, price));
            }
            None => warn!(instrument = %name, "no price for instrument in snapshot"),
        }
    }

    out
}
