#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use baseline::{Baseline, BaselineStore, DesiredSet};
use market::{PriceQuote, PriceSnapshot, PriceSource, PriceSourceError};
use notify::{Notifier, NotifyError};
use scheduler::{ConfigSource, Tunables};

#[derive(Default)]
pub struct MockStore {
    pub rows: Mutex<BTreeMap<String, Baseline>>,
    pub writes: AtomicUsize,
    pub fail_reads: AtomicBool,
}

impl MockStore {
    pub fn with_price(name: &str, accepted_delta: f64, price: f64) -> Self {
        let store = Self::default();
        store.rows.lock().unwrap().insert(
            name.to_string(),
            Baseline {
                name: name.to_string(),
                accepted_delta: Some(accepted_delta),
                last_price: Some(price),
                last_update: None,
            },
        );
        store
    }

    pub fn price_of(&self, name: &str) -> Option<f64> {
        self.rows.lock().unwrap().get(name).and_then(|b| b.last_price)
    }
}

#[async_trait]
impl BaselineStore for MockStore {
    async fn get_all(&self) -> anyhow::Result<BTreeMap<String, Baseline>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("database is locked");
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn upsert(
        &self,
        name: &str,
        accepted_delta: Option<f64>,
        price: Option<f64>,
    ) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(name.to_string()).or_insert_with(|| Baseline {
            name: name.to_string(),
            accepted_delta: None,
            last_price: None,
            last_update: None,
        });
        row.accepted_delta = accepted_delta;
        if price.is_some() {
            row.last_price = price;
        }
        Ok(())
    }
}

/// Serves whatever snapshot was set last; `None` means unavailable.
#[derive(Default)]
pub struct ScriptedPrices {
    pub snapshot: Mutex<Option<PriceSnapshot>>,
    pub calls: AtomicUsize,
}

impl ScriptedPrices {
    pub fn set(&self, quotes: &[(&str, f64)]) {
        *self.snapshot.lock().unwrap() = Some(PriceSnapshot::new(
            quotes.iter().map(|(n, p)| PriceQuote::new(*n, *p)).collect(),
        ));
    }

    pub fn go_down(&self) {
        *self.snapshot.lock().unwrap() = None;
    }
}

#[async_trait]
impl PriceSource for ScriptedPrices {
    async fn fetch_snapshot(&self) -> Result<PriceSnapshot, PriceSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or(PriceSourceError::Empty)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected("Bad Gateway".into()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// `None` in either slot makes the corresponding load fail.
#[derive(Default)]
pub struct StaticConfig {
    pub tunables: Mutex<Option<Tunables>>,
    pub instruments: Mutex<Option<DesiredSet>>,
}

impl StaticConfig {
    pub fn new(tunables: Tunables, instruments: &[(&str, f64)]) -> Self {
        let cfg = Self::default();
        *cfg.tunables.lock().unwrap() = Some(tunables);
        cfg.set_instruments(Some(instruments));
        cfg
    }

    pub fn set_instruments(&self, instruments: Option<&[(&str, f64)]>) {
        *self.instruments.lock().unwrap() = instruments.map(|list| {
            list.iter()
                .map(|(n, d)| (n.to_string(), Some(*d)))
                .collect()
        });
    }
}

#[async_trait]
impl ConfigSource for StaticConfig {
    async fn load_tunables(&self) -> anyhow::Result<Tunables> {
        let tunables = *self.tunables.lock().unwrap();
        tunables.ok_or_else(|| anyhow::anyhow!("config.json: no such file"))
    }

    async fn load_instruments(&self) -> anyhow::Result<DesiredSet> {
        self.instruments
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("tickers.json: unexpected EOF"))
    }
}

/// Quiet tunables: no heartbeat, digest far away, no pause.
pub fn tunables() -> Tunables {
    Tunables {
        pause: Duration::ZERO,
        digest_interval: Duration::from_secs(4 * 60 * 60),
        heartbeat_every: 0,
        ..Tunables::default()
    }
}
