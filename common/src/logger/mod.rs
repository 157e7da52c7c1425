mod files;
mod init;
mod spans;
mod trace_id;

pub use files::{DailyLogFile, LOG_FILE_SUFFIX, log_file_name, prune_logs_before, prune_old_logs};
pub use init::init_logger;
pub use spans::cycle_span;
pub use trace_id::TraceId;
