use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use http::HeaderMap;
use missive_core::EnvelopeInput;

use crate::names;

/// Case-insensitive header lookup built from a [`HeaderSource`].
///
/// Keys are lower-cased. Repeated headers keep every non-blank value in
/// arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLookup {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderLookup {
    /// Records one value for `name`. Blank values are ignored.
    pub fn append(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.entries
            .entry(name.trim().to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
    }

    /// Values of `name` joined with `,`, or `None` when absent.
    ///
    /// Joining is lossy when a value itself contains a comma.
    pub fn get(&self, name: &str) -> Option<String> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .filter(|values| !values.is_empty())
            .map(|values| values.join(","))
    }
}

/// Values a header-map entry may hold: a scalar, a list, or nothing.
pub trait HeaderValues {
    /// Appends each value to `out`.
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>);
}

impl HeaderValues for str {
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self);
    }
}

impl HeaderValues for String {
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self);
    }
}

impl<T: HeaderValues + ?Sized> HeaderValues for &T {
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        (**self).push_values(out);
    }
}

impl<T: HeaderValues> HeaderValues for Option<T> {
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(value) = self {
            value.push_values(out);
        }
    }
}

impl<T: HeaderValues> HeaderValues for [T] {
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        for value in self {
            value.push_values(out);
        }
    }
}

impl<T: HeaderValues> HeaderValues for Vec<T> {
    fn push_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        self.as_slice().push_values(out);
    }
}

/// Anything headers can be read from.
pub trait HeaderSource {
    /// Copies every header into `lookup`.
    fn collect_into(&self, lookup: &mut HeaderLookup);

    /// Builds a fresh lookup.
    fn to_lookup(&self) -> HeaderLookup {
        let mut lookup = HeaderLookup::default();
        self.collect_into(&mut lookup);
        lookup
    }
}

fn append_values<K, V>(lookup: &mut HeaderLookup, name: &K, value: &V)
where
    K: AsRef<str> + ?Sized,
    V: HeaderValues + ?Sized,
{
    let mut values = Vec::new();
    value.push_values(&mut values);
    for value in values {
        lookup.append(name.as_ref(), value);
    }
}

/// Values that are not valid UTF-8 are skipped.
impl HeaderSource for HeaderMap {
    fn collect_into(&self, lookup: &mut HeaderLookup) {
        for (name, value) in self.iter() {
            if let Ok(value) = value.to_str() {
                lookup.append(name.as_str(), value);
            }
        }
    }
}

impl<K, V, S> HeaderSource for HashMap<K, V, S>
where
    K: AsRef<str>,
    V: HeaderValues,
    S: BuildHasher,
{
    fn collect_into(&self, lookup: &mut HeaderLookup) {
        for (name, value) in self {
            append_values(lookup, name, value);
        }
    }
}

impl<K, V> HeaderSource for BTreeMap<K, V>
where
    K: AsRef<str>,
    V: HeaderValues,
{
    fn collect_into(&self, lookup: &mut HeaderLookup) {
        for (name, value) in self {
            append_values(lookup, name, value);
        }
    }
}

impl<K, V> HeaderSource for [(K, V)]
where
    K: AsRef<str>,
    V: HeaderValues,
{
    fn collect_into(&self, lookup: &mut HeaderLookup) {
        for (name, value) in self {
            append_values(lookup, name, value);
        }
    }
}

impl<K, V> HeaderSource for Vec<(K, V)>
where
    K: AsRef<str>,
    V: HeaderValues,
{
    fn collect_into(&self, lookup: &mut HeaderLookup) {
        self.as_slice().collect_into(lookup);
    }
}

impl<K, V, const N: usize> HeaderSource for [(K, V); N]
where
    K: AsRef<str>,
    V: HeaderValues,
{
    fn collect_into(&self, lookup: &mut HeaderLookup) {
        self.as_slice().collect_into(lookup);
    }
}

/// Envelope context recovered from inbound headers. Every field is
/// optional; blank headers read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderContext {
    /// `x-correlation-id`.
    pub correlation_id: Option<String>,
    /// `x-idempotency-key`.
    pub idempotency_key: Option<String>,
    /// `x-envelope-id`.
    pub envelope_id: Option<String>,
    /// `x-envelope-type`.
    pub event_type: Option<String>,
    /// `x-envelope-source`.
    pub source: Option<String>,
    /// `x-causation-id`.
    pub causation_id: Option<String>,
    /// `x-tenant-id`.
    pub tenant_id: Option<String>,
    /// `traceparent`.
    pub traceparent: Option<String>,
    /// `tracestate`.
    pub tracestate: Option<String>,
}

impl HeaderContext {
    /// True when no envelope header was found.
    pub fn is_empty(&self) -> bool {
        self == &HeaderContext::default()
    }

    /// Fills the chain fields of a follow-up envelope that are still unset:
    /// correlation, tenant and trace are inherited and `causation_id`
    /// becomes the inbound envelope id.
    pub fn inherit_into<D>(&self, mut input: EnvelopeInput<D>) -> EnvelopeInput<D> {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            if slot.as_deref().map_or(true, |s| s.trim().is_empty()) {
                if let Some(value) = value {
                    *slot = Some(value.clone());
                }
            }
        }
        fill(&mut input.correlation_id, &self.correlation_id);
        fill(&mut input.causation_id, &self.envelope_id);
        fill(&mut input.tenant_id, &self.tenant_id);
        if input.traceparent.is_none() {
            input.traceparent = self.traceparent.clone();
            input.tracestate = self.tracestate.clone();
        }
        input
    }
}

/// Reads envelope context from any header source. Lookup is
/// case-insensitive; repeated headers are joined with `,`.
pub fn from_headers<S: HeaderSource + ?Sized>(source: &S) -> HeaderContext {
    let lookup = source.to_lookup();
    HeaderContext {
        correlation_id: lookup.get(names::CORRELATION_ID),
        idempotency_key: lookup.get(names::IDEMPOTENCY_KEY),
        envelope_id: lookup.get(names::ENVELOPE_ID),
        event_type: lookup.get(names::ENVELOPE_TYPE),
        source: lookup.get(names::ENVELOPE_SOURCE),
        causation_id: lookup.get(names::CAUSATION_ID),
        tenant_id: lookup.get(names::TENANT_ID),
        traceparent: lookup.get(names::TRACEPARENT),
        tracestate: lookup.get(names::TRACESTATE),
    }
}
