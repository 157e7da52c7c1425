pub mod config;
pub mod detector;
pub mod engine;
pub mod errors;
pub mod policy;
pub mod state;
pub mod types;

pub use config::{ConfigSource, JsonFileConfig};
pub use detector::{BreachRule, Detection, detect};
pub use engine::{CycleOutcome, CycleScheduler};
pub use errors::SchedulerError;
pub use types::Tunables;
