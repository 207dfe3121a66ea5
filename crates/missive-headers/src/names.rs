//! Wire names. Envelope fields use an `x-` prefix; W3C trace headers keep
//! their registered names. All names are lower case.

/// `correlation_id`.
pub const CORRELATION_ID: &str = "x-correlation-id";
/// `idempotency_key`.
pub const IDEMPOTENCY_KEY: &str = "x-idempotency-key";
/// `id`.
pub const ENVELOPE_ID: &str = "x-envelope-id";
/// `type`.
pub const ENVELOPE_TYPE: &str = "x-envelope-type";
/// `source`.
pub const ENVELOPE_SOURCE: &str = "x-envelope-source";
/// `causation_id`.
pub const CAUSATION_ID: &str = "x-causation-id";
/// `tenant_id`.
pub const TENANT_ID: &str = "x-tenant-id";
/// W3C `traceparent`.
pub const TRACEPARENT: &str = "traceparent";
/// W3C `tracestate`.
pub const TRACESTATE: &str = "tracestate";
