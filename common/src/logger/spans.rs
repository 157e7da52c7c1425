use tracing::Span;

use super::TraceId;

/// Root span for one monitoring cycle. Everything logged while the cycle
/// runs inherits `cycle` and `trace_id`.
pub fn cycle_span(cycle: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!("cycle", cycle = cycle, trace_id = %trace_id)
}
