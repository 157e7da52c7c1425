pub mod model;
pub mod reconcile;
pub mod store;

pub use model::{Baseline, DesiredSet, Observation};
pub use reconcile::{ReconcileReport, reconcile};
pub use store::BaselineStore;
