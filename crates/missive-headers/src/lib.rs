//! Transport header binding for Missive envelopes.
//!
//! Outbound, [`to_headers`] projects the correlation and trace fields of an
//! envelope onto a flat header list. Inbound, [`from_headers`] reads them
//! back from any [`HeaderSource`]: an `http::HeaderMap`, a string-keyed map
//! whose values may be scalars, lists or absent, or a list of pairs.
//!
//! The trace probe ([`TraceContextProvider`]) reads `traceparent` and
//! `tracestate` from an ambient telemetry context. It is best effort: a
//! missing or failing provider yields an empty [`TraceContext`].
#![deny(missing_docs)]

/// Header names.
pub mod names;
/// Envelope → headers.
pub mod outbound;
/// Headers → context.
pub mod inbound;
/// Ambient trace context probing.
pub mod trace;

pub use inbound::{from_headers, HeaderContext, HeaderLookup, HeaderSource, HeaderValues};
pub use outbound::{to_headers, EnvelopeHeaders, HeaderError};
pub use trace::{probe_trace_context, NoopTraceContext, TraceContext, TraceContextProvider};

#[cfg(feature = "otel")]
pub use trace::OtelTraceContext;
