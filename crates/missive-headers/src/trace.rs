use std::panic::{catch_unwind, AssertUnwindSafe};

use missive_canonical::is_traceparent;
use missive_core::EnvelopeInput;
use tracing::debug;

/// W3C trace context read from an ambient telemetry system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// `traceparent`, when a valid span is active.
    pub traceparent: Option<String>,
    /// `tracestate`, when non-empty.
    pub tracestate: Option<String>,
}

impl TraceContext {
    /// True when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.traceparent.is_none()
    }

    /// Sets trace fields on `input` unless it already carries a
    /// `traceparent`.
    pub fn apply_to<D>(&self, mut input: EnvelopeInput<D>) -> EnvelopeInput<D> {
        if input.traceparent.is_none() {
            if let Some(traceparent) = &self.traceparent {
                input.traceparent = Some(traceparent.clone());
                input.tracestate = self.tracestate.clone();
            }
        }
        input
    }
}

/// Source of the currently active trace context.
///
/// Implementations should be cheap and must not block.
pub trait TraceContextProvider: Send + Sync {
    /// Context of the active span, or empty.
    fn current(&self) -> TraceContext;
}

/// Provider used when no telemetry system is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceContext;

impl TraceContextProvider for NoopTraceContext {
    fn current(&self) -> TraceContext {
        TraceContext::default()
    }
}

/// Asks `provider` for the active trace context.
///
/// Never fails. A panicking provider or a malformed `traceparent` yields an
/// empty context.
pub fn probe_trace_context(provider: &dyn TraceContextProvider) -> TraceContext {
    let context = match catch_unwind(AssertUnwindSafe(|| provider.current())) {
        Ok(context) => context,
        Err(_) => {
            debug!("trace context provider panicked; continuing without trace context");
            return TraceContext::default();
        }
    };
    match context.traceparent {
        Some(traceparent) if is_traceparent(&traceparent) => TraceContext {
            traceparent: Some(traceparent),
            tracestate: context.tracestate.filter(|s| !s.trim().is_empty()),
        },
        Some(_) => {
            debug!("ignoring malformed traceparent from provider");
            TraceContext::default()
        }
        None => TraceContext::default(),
    }
}

/// Reads the active OpenTelemetry span from the current context.
#[cfg(feature = "otel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct OtelTraceContext;

#[cfg(feature = "otel")]
impl TraceContextProvider for OtelTraceContext {
    fn current(&self) -> TraceContext {
        use opentelemetry::trace::TraceContextExt;

        let context = opentelemetry::Context::current();
        let span = context.span();
        let span_context = span.span_context();
        if !span_context.is_valid() {
            return TraceContext::default();
        }
        let tracestate = span_context.trace_state().header();
        TraceContext {
            traceparent: Some(format!(
                "00-{}-{}-{:02x}",
                span_context.trace_id(),
                span_context.span_id(),
                span_context.trace_flags().to_u8()
            )),
            tracestate: (!tracestate.is_empty()).then_some(tracestate),
        }
    }
}
