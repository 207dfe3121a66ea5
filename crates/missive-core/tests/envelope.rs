use chrono::{TimeZone, Utc};
use missive_core::{
    create_command, create_error_reply, create_event, create_reply, normalize, normalize_at,
    parse, parse_value, validate, Actor, AuthContext, AuthMethod, EnvelopeError, EnvelopeInput,
    ErrorReply, IssueCode, MessageEnvelope, Signature, SignatureAlg, DEFAULT_CONTENT_TYPE,
    ERROR_REPLY_TYPE, SPEC_VERSION,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn make_input() -> EnvelopeInput {
    EnvelopeInput::new("order.created", "svc.orders", json!({"orderId": "123"}))
}

fn make_envelope() -> MessageEnvelope {
    create_event(make_input()).unwrap()
}

fn issue_paths(err: &EnvelopeError) -> Vec<&str> {
    err.issues().iter().map(|i| i.path.as_str()).collect()
}

#[test]
fn create_event_fills_defaults() {
    let envelope = make_envelope();
    assert_eq!(envelope.specversion, SPEC_VERSION);
    assert_eq!(envelope.id.len(), 26);
    assert_eq!(envelope.correlation_id, envelope.id);
    assert_eq!(envelope.datacontenttype, DEFAULT_CONTENT_TYPE);
    assert_eq!(envelope.retry_count, 0);
    assert!(envelope.idempotency_key.starts_with("sha256:"));
    assert!(validate(&envelope).ok());
}

#[test]
fn factories_are_equivalent() {
    let input = make_input().correlation_id("corr-1");
    let event = create_event(input.clone()).unwrap();
    let command = create_command(input.clone()).unwrap();
    let reply = create_reply(input).unwrap();
    assert_eq!(event.idempotency_key, command.idempotency_key);
    assert_eq!(command.idempotency_key, reply.idempotency_key);
}

#[test]
fn same_business_identity_same_key_different_id() {
    let first = normalize(make_input().correlation_id("corr-1")).unwrap();
    let second = normalize(make_input().correlation_id("corr-1")).unwrap();
    assert_eq!(first.idempotency_key, second.idempotency_key);
    assert_ne!(first.id, second.id);
}

#[test]
fn explicit_idempotency_key_wins() {
    let envelope = normalize(make_input().idempotency_key("  order-123  ")).unwrap();
    assert_eq!(envelope.idempotency_key, "order-123");
}

#[test]
fn missing_data_fails_even_when_everything_else_is_valid() {
    let input: EnvelopeInput<Value> = EnvelopeInput::default()
        .event_type("order.created")
        .source("svc.orders");
    let err = normalize(input).unwrap_err();
    assert!(matches!(err, EnvelopeError::Validation(_)));
    assert_eq!(issue_paths(&err), vec!["data"]);
}

#[test]
fn blank_type_and_source_are_reported_together() {
    let err = normalize(EnvelopeInput::new("  ", "", json!({}))).unwrap_err();
    assert_eq!(issue_paths(&err), vec!["type", "source"]);
    assert!(err.issues().iter().all(|i| i.code == IssueCode::Required));
}

#[test]
fn malformed_formats_fail_validation() {
    let err = normalize(
        EnvelopeInput::new("Order", "svc.orders", json!({}))
            .time("2024-01-01 00:00:00")
            .dataschema("ftp://schemas.example.com/order.json")
            .trace("garbage", None),
    )
    .unwrap_err();
    assert_eq!(issue_paths(&err), vec!["type", "time", "dataschema", "traceparent"]);
}

#[test]
fn ttl_and_retry_ranges() {
    let err = normalize(make_input().ttl_sec(0).retry_count(-1)).unwrap_err();
    assert_eq!(issue_paths(&err), vec!["ttl_sec", "retry_count"]);

    let envelope = normalize(make_input().ttl_sec(60).retry_count(3)).unwrap();
    assert_eq!(envelope.ttl_sec, Some(60));
    assert_eq!(envelope.retry_count, 3);
}

#[test]
fn jwt_token_ref_is_a_security_error() {
    let err = normalize(make_input().auth_context(AuthContext {
        method: AuthMethod::Jwt,
        token_ref: Some("xxx.yyy.zzz".into()),
    }))
    .unwrap_err();
    assert!(matches!(err, EnvelopeError::Security(_)));
    assert!(!err.is_retryable());
}

#[test]
fn bearer_token_ref_is_a_security_error() {
    let err = normalize(make_input().auth_context(AuthContext {
        method: AuthMethod::Jwt,
        token_ref: Some("Bearer abc.def".into()),
    }))
    .unwrap_err();
    match err {
        EnvelopeError::Security(violation) => {
            assert_eq!(violation.path, "auth_context.token_ref");
            assert!(!violation.to_string().contains("abc.def"));
        }
        other => panic!("expected security error, got {:?}", other),
    }
}

#[test]
fn security_error_takes_precedence_over_validation_issues() {
    let err = normalize(
        EnvelopeInput::new("", "svc.orders", json!({})).auth_context(AuthContext {
            method: AuthMethod::ApiKey,
            token_ref: Some("Bearer leaked".into()),
        }),
    )
    .unwrap_err();
    assert!(matches!(err, EnvelopeError::Security(_)));
}

#[test]
fn token_reference_is_accepted() {
    let envelope = normalize(make_input().auth_context(AuthContext {
        method: AuthMethod::MTlsJwt,
        token_ref: Some("token://vault/abc".into()),
    }))
    .unwrap();
    let auth = envelope.auth_context.unwrap();
    assert_eq!(auth.method, AuthMethod::MTlsJwt);
    assert_eq!(auth.token_ref.as_deref(), Some("token://vault/abc"));
}

#[test]
fn unknown_auth_method_is_rejected() {
    let err = normalize(make_input().auth_context(AuthContext {
        method: AuthMethod::from("kerberos"),
        token_ref: None,
    }))
    .unwrap_err();
    assert_eq!(issue_paths(&err), vec!["auth_context.method"]);
}

#[test]
fn validator_reports_every_problem_at_once() {
    let mut envelope = make_envelope();
    envelope.specversion = "0.9".into();
    envelope.id = "   ".into();
    envelope.time = "yesterday".into();
    envelope.retry_count = -1;
    envelope.auth_context = Some(AuthContext {
        method: AuthMethod::from("PASSWORD"),
        token_ref: None,
    });

    let report = validate(&envelope);
    assert!(!report.ok());
    let paths: Vec<_> = report.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["specversion", "id", "time", "retry_count", "auth_context.method"]
    );
}

#[test]
fn validator_catches_hand_built_invariant_breaks() {
    let mut envelope = make_envelope();
    envelope.actor = Some(Actor {
        sub: "user-1".into(),
        act: None,
        scopes: Some(vec!["write".into(), "read".into()]),
    });
    envelope.auth_context = Some(AuthContext {
        method: AuthMethod::Jwt,
        token_ref: Some("Bearer abc".into()),
    });
    envelope.signature = Some(Signature {
        alg: SignatureAlg::from("RS256"),
        kid: "".into(),
        value: "abc".into(),
    });

    let report = validate(&envelope);
    let codes: Vec<_> = report
        .issues()
        .iter()
        .map(|i| (i.path.as_str(), i.code))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("actor.scopes", IssueCode::NotNormalized),
            ("auth_context.token_ref", IssueCode::Forbidden),
            ("signature.alg", IssueCode::InvalidValue),
            ("signature.kid", IssueCode::Required),
        ]
    );
}

#[test]
fn error_reply_defaults_type() {
    let context: EnvelopeInput<()> = EnvelopeInput::default()
        .source("svc.orders")
        .causation_id("01HZY0000000000000000000000");
    let reply = create_error_reply(
        context,
        ErrorReply {
            code: "ORDER_NOT_FOUND".into(),
            message: "order 123 does not exist".into(),
            details: Some(json!({"orderId": "123"})),
        },
    )
    .unwrap();
    assert_eq!(reply.event_type, ERROR_REPLY_TYPE);
    assert_eq!(reply.data.code, "ORDER_NOT_FOUND");

    let wire = serde_json::to_value(&reply).unwrap();
    assert_eq!(wire["data"]["details"]["orderId"], "123");
    assert_eq!(wire["type"], "error.reply");
}

#[test]
fn error_reply_type_can_be_overridden() {
    let context: EnvelopeInput<()> = EnvelopeInput::default()
        .event_type("payment.failed")
        .source("svc.payments");
    let reply = create_error_reply(context, ErrorReply::new("DECLINED", "card declined")).unwrap();
    assert_eq!(reply.event_type, "payment.failed");
    assert!(serde_json::to_value(&reply).unwrap()["data"]
        .get("details")
        .is_none());
}

#[test]
fn child_input_links_causal_chain() {
    let parent = normalize(
        make_input()
            .tenant_id("tenant-a")
            .trace("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01", None),
    )
    .unwrap();
    let child = normalize(parent.child_input("invoice.requested", "svc.billing", json!({"n": 1})))
        .unwrap();
    assert_eq!(child.correlation_id, parent.correlation_id);
    assert_eq!(child.causation_id.as_deref(), Some(parent.id.as_str()));
    assert_eq!(child.tenant_id.as_deref(), Some("tenant-a"));
    assert_eq!(child.traceparent, parent.traceparent);
    assert_ne!(child.id, parent.id);
}

#[test]
fn retry_copy_drops_signature() {
    let mut envelope = make_envelope();
    envelope.signature = Some(Signature {
        alg: SignatureAlg::Hs256,
        kid: "k1".into(),
        value: "c2ln".into(),
    });
    let retried = envelope.with_retry();
    assert_eq!(retried.retry_count, 1);
    assert!(!retried.is_signed());
    assert_eq!(retried.idempotency_key, envelope.idempotency_key);
}

#[test]
fn ttl_expiry_is_computed_from_time() {
    let now = Utc.timestamp_millis_opt(1_704_067_200_000).unwrap();
    let envelope = normalize_at(make_input().ttl_sec(30), now).unwrap();
    assert_eq!(
        envelope.expires_at(),
        Some(Utc.timestamp_millis_opt(1_704_067_230_000).unwrap())
    );
    assert!(!envelope.is_expired_at(now));
    assert!(envelope.is_expired_at(Utc.timestamp_millis_opt(1_704_067_230_000).unwrap()));
    assert!(!make_envelope().is_expired_at(Utc::now()));
}

#[test]
fn serialized_envelope_parses_back_unchanged() {
    let envelope = normalize(
        make_input()
            .subject("order-123")
            .actor(Actor {
                sub: "user-1".into(),
                act: Some("svc.gateway".into()),
                scopes: Some(vec!["orders:write".into(), "orders:read".into()]),
            })
            .auth_context(AuthContext {
                method: AuthMethod::MTls,
                token_ref: Some("token://vault/abc".into()),
            }),
    )
    .unwrap();
    let wire = serde_json::to_string(&envelope).unwrap();
    let parsed = parse(&wire).unwrap();
    assert_eq!(parsed, envelope);
}

#[test]
fn wire_shape_omits_absent_fields() {
    let wire = serde_json::to_value(make_envelope()).unwrap();
    let object = wire.as_object().unwrap();
    for absent in ["subject", "dataschema", "traceparent", "actor", "signature", "ttl_sec"] {
        assert!(!object.contains_key(absent), "{} should be absent", absent);
    }
    assert_eq!(object["type"], "order.created");
    assert_eq!(object["retry_count"], 0);
}

#[test]
fn parse_surfaces_normalizer_errors_as_is() {
    let err = parse_value(json!({
        "type": "order.created",
        "source": "svc.orders",
        "auth_context": {"method": "JWT", "token_ref": "Bearer abc"},
        "data": {}
    }))
    .unwrap_err();
    assert!(matches!(err, EnvelopeError::Security(_)));

    let err = parse_value(json!({
        "specversion": "2.0",
        "type": "order.created",
        "source": "svc.orders",
        "data": {}
    }))
    .unwrap_err();
    assert_eq!(issue_paths(&err), vec!["specversion"]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OrderCreated {
    order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    coupon: Option<String>,
}

#[test]
fn typed_and_json_payloads_share_keys() {
    let typed = normalize(
        EnvelopeInput::new(
            "order.created",
            "svc.orders",
            OrderCreated {
                order_id: "1".into(),
                coupon: None,
            },
        )
        .correlation_id("c"),
    )
    .unwrap();
    let untyped = normalize(
        EnvelopeInput::new("order.created", "svc.orders", json!({"order_id": "1"}))
            .correlation_id("c"),
    )
    .unwrap();
    assert_eq!(typed.idempotency_key, untyped.idempotency_key);
}

proptest! {
    #[test]
    fn idempotency_key_is_deterministic(order_id in "[a-z0-9]{1,12}", amount in 0u32..100_000, subject in proptest::option::of("[a-z]{1,8}")) {
        let build = || {
            let mut input = EnvelopeInput::new(
                "order.created",
                "svc.orders",
                json!({"orderId": order_id, "amount": amount}),
            )
            .correlation_id("corr-fixed");
            input.subject = subject.clone();
            normalize(input).unwrap()
        };
        let first = build();
        let second = build();
        prop_assert_eq!(&first.idempotency_key, &second.idempotency_key);
        prop_assert_ne!(&first.id, &second.id);
    }
}
