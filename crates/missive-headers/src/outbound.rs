use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use missive_core::MessageEnvelope;
use thiserror::Error;

use crate::names;

/// Failure writing headers onto a native header map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The value contains bytes not allowed in a header value.
    #[error("value for header `{0}` is not a valid header value")]
    InvalidValue(&'static str),
}

/// Ordered header list produced by [`to_headers`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvelopeHeaders {
    entries: Vec<(&'static str, String)>,
}

impl EnvelopeHeaders {
    fn push(&mut self, name: &'static str, value: &str) {
        self.entries.push((name, value.to_string()));
    }

    fn push_opt(&mut self, name: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.push(name, value);
        }
    }

    /// Value of `name`, if emitted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Entries in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes every header onto `map`, replacing existing values.
    ///
    /// Nothing is written unless every value is a legal header value.
    pub fn apply_to(&self, map: &mut HeaderMap) -> Result<(), HeaderError> {
        let mut converted = Vec::with_capacity(self.entries.len());
        for (name, value) in self.iter() {
            let value =
                HeaderValue::from_str(value).map_err(|_| HeaderError::InvalidValue(name))?;
            converted.push((HeaderName::from_static(name), value));
        }
        for (name, value) in converted {
            map.insert(name, value);
        }
        Ok(())
    }

    /// Builds a fresh `http::HeaderMap`.
    pub fn to_header_map(&self) -> Result<HeaderMap, HeaderError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        self.apply_to(&mut map)?;
        Ok(map)
    }
}

/// Projects an envelope onto transport headers.
///
/// Correlation id, idempotency key, id, type and source are always
/// emitted; trace fields, causation id and tenant id only when set.
pub fn to_headers<D>(envelope: &MessageEnvelope<D>) -> EnvelopeHeaders {
    let mut headers = EnvelopeHeaders::default();
    headers.push(names::CORRELATION_ID, &envelope.correlation_id);
    headers.push(names::IDEMPOTENCY_KEY, &envelope.idempotency_key);
    headers.push(names::ENVELOPE_ID, &envelope.id);
    headers.push(names::ENVELOPE_TYPE, &envelope.event_type);
    headers.push(names::ENVELOPE_SOURCE, &envelope.source);
    headers.push_opt(names::TRACEPARENT, envelope.traceparent.as_deref());
    headers.push_opt(names::TRACESTATE, envelope.tracestate.as_deref());
    headers.push_opt(names::CAUSATION_ID, envelope.causation_id.as_deref());
    headers.push_opt(names::TENANT_ID, envelope.tenant_id.as_deref());
    headers
}
