//! Brings the baseline table in line with what the current cycle knows.
//!
//! Runs twice per cycle: before fetching, with the configured tolerances
//! only (registers new instruments, applies tolerance edits), and after
//! fetching, with the observed prices (moves the baseline forward).
//!
//! Each instrument is written independently. A failed write is logged and
//! counted; the remaining instruments are still processed.

use std::collections::BTreeMap;

use tracing::{debug, error, info};

use crate::model::Observation;
use crate::store::BaselineStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ReconcileReport {
    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Reconciles `observations` against the store.
///
/// Returns `Err` only when the baseline snapshot cannot be read; per-row
/// write failures are reported in [`ReconcileReport::failed`].
pub async fn reconcile(
    store: &dyn BaselineStore,
    observations: &BTreeMap<String, Observation>,
) -> anyhow::Result<ReconcileReport> {
    let existing = store.get_all().await?;
    let mut report = ReconcileReport::default();

    for (name, obs) in observations {
        let Some(current) = existing.get(name) else {
            match store.upsert(name, obs.accepted_delta, obs.price).await {
                Ok(()) => {
                    report.inserted += 1;
                    info!(
                        instrument = %name,
                        accepted_delta = ?obs.accepted_delta,
                        price = ?obs.price,
                        "instrument added to baseline"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(instrument = %name, error = ?e, "failed to add instrument");
                }
            }
            continue;
        };

        let delta_changed = obs.accepted_delta != current.accepted_delta;
        // No observation is not a change.
        let price_changed = obs.price.is_some() && obs.price != current.last_price;

        if !delta_changed && !price_changed {
            report.unchanged += 1;
            continue;
        }

        if let Err(e) = store.upsert(name, obs.accepted_delta, obs.price).await {
            report.failed += 1;
            error!(instrument = %name, error = ?e, "failed to update baseline");
            continue;
        }
        report.updated += 1;

        if delta_changed {
            info!(
                instrument = %name,
                old = ?current.accepted_delta,
                new = ?obs.accepted_delta,
                "accepted delta changed"
            );
        }
        if price_changed {
            debug!(
                instrument = %name,
                old = ?current.last_price,
                new = ?obs.price,
                "baseline price moved"
            );
        }
    }

    Ok(report)
}
