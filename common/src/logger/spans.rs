use tracing::{Span, field};

use super::TraceId;

/// Root span for one pipeline run. Everything the run spawns should be
/// instrumented with this span or a child of it.
pub fn run_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "run",
        name = %name,
        trace_id = %trace_id,
        query = field::Empty
    )
}

/// Child span; inherits `trace_id` from whatever span is current.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name)
}
