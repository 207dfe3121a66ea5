use serde_json::Value;

use crate::envelope::{Actor, AuthContext, Signature};

/// Partial envelope handed to the normalizer.
///
/// `data` is required; `None` means the key was absent, which the
/// normalizer rejects. A JSON `null` payload is `Some(Value::Null)`.
/// Every other field is optional and blank strings count as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeInput<D = Value> {
    /// Envelope format version; defaults to the current one.
    pub specversion: Option<String>,
    /// Identifier; generated when absent.
    pub id: Option<String>,
    /// Dotted event type.
    pub event_type: Option<String>,
    /// Producer name.
    pub source: Option<String>,
    /// Subject within the source.
    pub subject: Option<String>,
    /// Production time; defaults to now.
    pub time: Option<String>,
    /// Media type of `data`.
    pub datacontenttype: Option<String>,
    /// Payload schema URL.
    pub dataschema: Option<String>,
    /// W3C `traceparent`.
    pub traceparent: Option<String>,
    /// W3C `tracestate`.
    pub tracestate: Option<String>,
    /// Correlation id; defaults to the resolved `id`.
    pub correlation_id: Option<String>,
    /// Parent envelope id.
    pub causation_id: Option<String>,
    /// Tenant partition hint.
    pub tenant_id: Option<String>,
    /// Acting principal.
    pub actor: Option<Actor>,
    /// Producer authentication context.
    pub auth_context: Option<AuthContext>,
    /// Explicit idempotency key; derived when absent.
    pub idempotency_key: Option<String>,
    /// Time to live in seconds.
    pub ttl_sec: Option<i64>,
    /// Delivery attempt counter.
    pub retry_count: Option<i64>,
    /// Signature block.
    pub signature: Option<Signature>,
    /// Business payload.
    pub data: Option<D>,
}

impl<D> Default for EnvelopeInput<D> {
    fn default() -> Self {
        Self {
            specversion: None,
            id: None,
            event_type: None,
            source: None,
            subject: None,
            time: None,
            datacontenttype: None,
            dataschema: None,
            traceparent: None,
            tracestate: None,
            correlation_id: None,
            causation_id: None,
            tenant_id: None,
            actor: None,
            auth_context: None,
            idempotency_key: None,
            ttl_sec: None,
            retry_count: None,
            signature: None,
            data: None,
        }
    }
}

impl<D> EnvelopeInput<D> {
    /// Request with the three fields every envelope needs.
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, data: D) -> Self {
        Self {
            event_type: Some(event_type.into()),
            source: Some(source.into()),
            data: Some(data),
            ..Self::default()
        }
    }

    /// Replaces the payload, keeping every other field.
    pub fn with_data<E>(self, data: E) -> EnvelopeInput<E> {
        EnvelopeInput {
            specversion: self.specversion,
            id: self.id,
            event_type: self.event_type,
            source: self.source,
            subject: self.subject,
            time: self.time,
            datacontenttype: self.datacontenttype,
            dataschema: self.dataschema,
            traceparent: self.traceparent,
            tracestate: self.tracestate,
            correlation_id: self.correlation_id,
            causation_id: self.causation_id,
            tenant_id: self.tenant_id,
            actor: self.actor,
            auth_context: self.auth_context,
            idempotency_key: self.idempotency_key,
            ttl_sec: self.ttl_sec,
            retry_count: self.retry_count,
            signature: self.signature,
            data: Some(data),
        }
    }

    /// Sets `type`.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets `source`.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets `id`.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets `subject`.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets `time`.
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Sets `dataschema`.
    pub fn dataschema(mut self, url: impl Into<String>) -> Self {
        self.dataschema = Some(url.into());
        self
    }

    /// Sets `correlation_id`.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Sets `causation_id`.
    pub fn causation_id(mut self, id: impl Into<String>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    /// Sets `tenant_id`.
    pub fn tenant_id(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant.into());
        self
    }

    /// Sets `traceparent` and optionally `tracestate`.
    pub fn trace(mut self, traceparent: impl Into<String>, tracestate: Option<String>) -> Self {
        self.traceparent = Some(traceparent.into());
        self.tracestate = tracestate;
        self
    }

    /// Sets `actor`.
    pub fn actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Sets `auth_context`.
    pub fn auth_context(mut self, auth: AuthContext) -> Self {
        self.auth_context = Some(auth);
        self
    }

    /// Overrides the derived idempotency key.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Sets `ttl_sec`.
    pub fn ttl_sec(mut self, ttl: i64) -> Self {
        self.ttl_sec = Some(ttl);
        self
    }

    /// Sets `retry_count`.
    pub fn retry_count(mut self, count: i64) -> Self {
        self.retry_count = Some(count);
        self
    }
}
