pub mod sqlite_store;

use std::collections::BTreeMap;

use crate::model::Baseline;

pub use sqlite_store::SqliteBaselineStore;

#[async_trait::async_trait]
pub trait BaselineStore: Send + Sync {
    /// Full snapshot of the table keyed by instrument name.
    async fn get_all(&self) -> anyhow::Result<BTreeMap<String, Baseline>>;

    /// Inserts the row if `name` is unknown; otherwise sets the tolerance,
    /// sets the price only when one is given, and refreshes the timestamp.
    async fn upsert(
        &self,
        name: &str,
        accepted_delta: Option<f64>,
        price: Option<f64>,
    ) -> anyhow::Result<()>;
}
