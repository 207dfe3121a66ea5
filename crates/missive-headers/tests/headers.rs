use std::collections::{BTreeMap, HashMap};

use http::HeaderMap;
use missive_core::{create_event, EnvelopeInput, MessageEnvelope};
use missive_headers::names::{
    CAUSATION_ID, CORRELATION_ID, ENVELOPE_ID, ENVELOPE_SOURCE, ENVELOPE_TYPE, IDEMPOTENCY_KEY,
    TENANT_ID, TRACEPARENT, TRACESTATE,
};
use missive_headers::{from_headers, to_headers, HeaderContext, HeaderError};
use serde_json::json;

const TP: &str = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";

fn make_envelope() -> MessageEnvelope {
    create_event(EnvelopeInput::new(
        "order.created",
        "svc.orders",
        json!({"orderId": "123"}),
    ))
    .unwrap()
}

fn make_traced_envelope() -> MessageEnvelope {
    create_event(
        EnvelopeInput::new("order.created", "svc.orders", json!({"orderId": "123"}))
            .trace(TP, Some("vendor=1".into()))
            .causation_id("parent-1")
            .tenant_id("acme"),
    )
    .unwrap()
}

#[test]
fn outbound_always_has_the_core_five() {
    let envelope = make_envelope();
    let headers = to_headers(&envelope);
    let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![CORRELATION_ID, IDEMPOTENCY_KEY, ENVELOPE_ID, ENVELOPE_TYPE, ENVELOPE_SOURCE]
    );
    assert_eq!(headers.get(ENVELOPE_ID), Some(envelope.id.as_str()));
    assert_eq!(headers.get("X-Envelope-Type"), Some("order.created"));
}

#[test]
fn outbound_optional_fields_when_present() {
    let headers = to_headers(&make_traced_envelope());
    assert_eq!(headers.len(), 9);
    assert_eq!(headers.get(TRACEPARENT), Some(TP));
    assert_eq!(headers.get(TRACESTATE), Some("vendor=1"));
    assert_eq!(headers.get(CAUSATION_ID), Some("parent-1"));
    assert_eq!(headers.get(TENANT_ID), Some("acme"));
}

#[test]
fn header_map_round_trip() {
    let envelope = make_traced_envelope();
    let map = to_headers(&envelope).to_header_map().unwrap();
    let context = from_headers(&map);
    assert_eq!(context.correlation_id.as_deref(), Some(envelope.correlation_id.as_str()));
    assert_eq!(context.idempotency_key.as_deref(), Some(envelope.idempotency_key.as_str()));
    assert_eq!(context.envelope_id.as_deref(), Some(envelope.id.as_str()));
    assert_eq!(context.event_type.as_deref(), Some("order.created"));
    assert_eq!(context.source.as_deref(), Some("svc.orders"));
    assert_eq!(context.traceparent.as_deref(), Some(TP));
    assert_eq!(context.tenant_id.as_deref(), Some("acme"));
}

#[test]
fn apply_to_rejects_illegal_values_without_partial_writes() {
    let mut envelope = make_envelope();
    envelope.correlation_id = "line\nbreak".into();
    let mut map = HeaderMap::new();
    assert_eq!(
        to_headers(&envelope).apply_to(&mut map),
        Err(HeaderError::InvalidValue(CORRELATION_ID))
    );
    assert!(map.is_empty());
}

#[test]
fn plain_map_with_mixed_values() {
    let mut source: HashMap<String, Vec<&str>> = HashMap::new();
    source.insert("X-Correlation-Id".into(), vec!["corr-1"]);
    source.insert("X-Tenant-Id".into(), vec!["a", "b"]);
    source.insert("X-Causation-Id".into(), vec![]);
    source.insert("X-Envelope-Id".into(), vec!["   "]);
    let context = from_headers(&source);
    assert_eq!(context.correlation_id.as_deref(), Some("corr-1"));
    assert_eq!(context.tenant_id.as_deref(), Some("a,b"));
    assert_eq!(context.causation_id, None);
    assert_eq!(context.envelope_id, None);
}

#[test]
fn optional_scalars_in_ordered_map() {
    let mut source: BTreeMap<&str, Option<String>> = BTreeMap::new();
    source.insert("traceparent", Some(TP.to_string()));
    source.insert("tracestate", None);
    let context = from_headers(&source);
    assert_eq!(context.traceparent.as_deref(), Some(TP));
    assert_eq!(context.tracestate, None);
}

#[test]
fn list_of_pairs_joins_repeats() {
    let pairs = [
        ("X-CORRELATION-ID", "corr-9"),
        ("x-tenant-id", "acme"),
        ("X-Tenant-Id", "beta"),
    ];
    let context = from_headers(&pairs);
    assert_eq!(context.correlation_id.as_deref(), Some("corr-9"));
    assert_eq!(context.tenant_id.as_deref(), Some("acme,beta"));

    let owned: Vec<(String, String)> = vec![("x-envelope-source".into(), "svc.billing".into())];
    assert_eq!(from_headers(&owned).source.as_deref(), Some("svc.billing"));
}

#[test]
fn empty_source_gives_empty_context() {
    let pairs: Vec<(String, String)> = Vec::new();
    assert!(from_headers(&pairs).is_empty());
    assert!(from_headers(&HeaderMap::new()).is_empty());
}

#[test]
fn inbound_context_seeds_a_follow_up() {
    let incoming = make_traced_envelope();
    let context: HeaderContext = from_headers(&to_headers(&incoming).to_header_map().unwrap());
    let input = context.inherit_into(EnvelopeInput::new(
        "invoice.requested",
        "svc.billing",
        json!({}),
    ));
    let follow_up = create_event(input).unwrap();
    assert_eq!(follow_up.correlation_id, incoming.correlation_id);
    assert_eq!(follow_up.causation_id.as_deref(), Some(incoming.id.as_str()));
    assert_eq!(follow_up.tenant_id.as_deref(), Some("acme"));
    assert_eq!(follow_up.traceparent.as_deref(), Some(TP));
}
