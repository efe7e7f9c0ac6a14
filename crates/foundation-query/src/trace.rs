//! Current trace lookup.
//!
//! The ambient trace id comes from the active OpenTelemetry span when one
//! is recording, and otherwise from the W3C `TRACEPARENT` variable that
//! instrumented parents pass to child processes.

use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;

/// Environment variable carrying a W3C trace context.
pub const TRACEPARENT_ENV: &str = "TRACEPARENT";

/// Source of the trace id for "search the current trace".
pub trait TraceContextSource {
    /// The active trace id as 32 lower-case hex digits, if any.
    fn current_trace_id(&self) -> Option<String>;
}

/// Reads the OpenTelemetry context, then `TRACEPARENT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbientTraceContext;

impl AmbientTraceContext {
    /// Create the ambient reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn from_opentelemetry() -> Option<String> {
        let cx = Context::current();
        let span = cx.span();
        let span_context = span.span_context();
        if span.is_recording() && span_context.is_valid() {
            Some(span_context.trace_id().to_string())
        } else {
            None
        }
    }

    /// Trace id of the recording span, else the one in `traceparent()`.
    fn from_opentelemetry_or(traceparent: impl FnOnce() -> Option<String>) -> Option<String> {
        Self::from_opentelemetry()
            .or_else(|| traceparent().and_then(|header| parse_traceparent(&header)))
    }
}

impl TraceContextSource for AmbientTraceContext {
    fn current_trace_id(&self) -> Option<String> {
        Self::from_opentelemetry_or(|| std::env::var(TRACEPARENT_ENV).ok())
    }
}

/// A fixed trace id, or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTraceContext(pub Option<String>);

impl TraceContextSource for StaticTraceContext {
    fn current_trace_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Extract the trace id from a `traceparent` header value.
///
/// Format: `{version:2}-{trace_id:32}-{parent_id:16}-{flags:2}`, all hex.
/// All-zero trace ids are invalid and yield `None`.
#[must_use]
pub fn parse_traceparent(header: &str) -> Option<String> {
    let mut parts = header.trim().split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let parent_id = parts.next()?;
    let flags = parts.next()?;

    let is_hex = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit());
    if !is_hex(version, 2) || version == "ff" || !is_hex(parent_id, 16) || !is_hex(flags, 2) {
        return None;
    }
    if version == "00" && parts.next().is_some() {
        return None;
    }
    if !is_hex(trace_id, 32) || trace_id.chars().all(|c| c == '0') {
        return None;
    }
    Some(trace_id.to_ascii_lowercase())
}
