//! The normalizing constructor.
//!
//! Order matters: `correlation_id` defaults to the resolved `id`, and the
//! idempotency key is derived from the already-trimmed identity fields.

use chrono::{DateTime, Utc};
use missive_canonical::{format_timestamp, generate_id};
use serde::Serialize;
use tracing::{debug, warn};

use crate::envelope::{
    Actor, AuthContext, AuthMethod, MessageEnvelope, Signature, SignatureAlg,
    DEFAULT_CONTENT_TYPE, SPEC_VERSION,
};
use crate::errors::{EnvelopeError, IssueCode, SecurityViolation, ValidationIssue};
use crate::idempotency::derive_idempotency_key;
use crate::input::EnvelopeInput;
use crate::security::check_token_ref;
use crate::validate::validate;

/// Builds an envelope from a creation request, stamping the current time.
///
/// # Errors
///
/// - [`EnvelopeError::Security`] when `auth_context.token_ref` holds a raw
///   credential; reported before any validation issue.
/// - [`EnvelopeError::Validation`] with every structural issue found.
/// - [`EnvelopeError::Serialization`] when `data` cannot be canonicalized.
pub fn normalize<D: Serialize>(input: EnvelopeInput<D>) -> Result<MessageEnvelope<D>, EnvelopeError> {
    normalize_at(input, Utc::now())
}

/// Same as [`normalize`] with an explicit clock reading, used for the
/// default `time` and the generated `id`.
pub fn normalize_at<D: Serialize>(
    input: EnvelopeInput<D>,
    now: DateTime<Utc>,
) -> Result<MessageEnvelope<D>, EnvelopeError> {
    let mut issues = Vec::new();

    let event_type = trimmed(input.event_type);
    if event_type.is_none() {
        issues.push(ValidationIssue::new("type", IssueCode::Required, "must not be blank"));
    }
    let source = trimmed(input.source);
    if source.is_none() {
        issues.push(ValidationIssue::new("source", IssueCode::Required, "must not be blank"));
    }
    if input.data.is_none() {
        issues.push(ValidationIssue::new("data", IssueCode::Required, "must be present"));
    }

    let id = trimmed(input.id)
        .unwrap_or_else(|| generate_id(now.timestamp_millis().max(0) as u64));
    let time = trimmed(input.time).unwrap_or_else(|| format_timestamp(now));
    let subject = trimmed(input.subject);
    let datacontenttype =
        trimmed(input.datacontenttype).unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let correlation_id = trimmed(input.correlation_id).unwrap_or_else(|| id.clone());

    let actor = input.actor.and_then(normalize_actor);
    let auth_context = match input.auth_context {
        Some(auth) => normalize_auth_context(auth)?,
        None => None,
    };

    if let Some(ttl) = input.ttl_sec {
        if ttl <= 0 {
            issues.push(ValidationIssue::new("ttl_sec", IssueCode::OutOfRange, "must be > 0"));
        }
    }
    let retry_count = input.retry_count.unwrap_or(0);
    if retry_count < 0 {
        issues.push(ValidationIssue::new(
            "retry_count",
            IssueCode::OutOfRange,
            "must be >= 0",
        ));
    }

    let signature = input
        .signature
        .map(|signature| normalize_signature(signature, &mut issues));

    let (event_type, source, data) = match (event_type, source, input.data) {
        (Some(event_type), Some(source), Some(data)) if issues.is_empty() => {
            (event_type, source, data)
        }
        _ => return Err(EnvelopeError::validation(issues)),
    };

    let idempotency_key = match trimmed(input.idempotency_key) {
        Some(key) => key,
        None => derive_idempotency_key(
            &event_type,
            &source,
            subject.as_deref(),
            &correlation_id,
            &data,
        )?,
    };

    let envelope = MessageEnvelope {
        specversion: trimmed(input.specversion).unwrap_or_else(|| SPEC_VERSION.to_string()),
        id,
        event_type,
        source,
        subject,
        time,
        datacontenttype,
        dataschema: trimmed(input.dataschema),
        traceparent: trimmed(input.traceparent),
        tracestate: trimmed(input.tracestate),
        correlation_id,
        causation_id: trimmed(input.causation_id),
        tenant_id: trimmed(input.tenant_id),
        actor,
        auth_context,
        idempotency_key,
        ttl_sec: input.ttl_sec,
        retry_count,
        signature: signature.flatten(),
        data,
    };

    validate(&envelope).into_result()?;

    debug!(
        envelope_id = %envelope.id,
        event_type = %envelope.event_type,
        source = %envelope.source,
        "normalized envelope"
    );
    Ok(envelope)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize_actor(actor: Actor) -> Option<Actor> {
    let sub = trimmed(Some(actor.sub))?;
    let scopes = actor.scopes.map(|scopes| {
        let mut scopes: Vec<String> = scopes
            .into_iter()
            .filter_map(|scope| trimmed(Some(scope)))
            .collect();
        scopes.sort();
        scopes.dedup();
        scopes
    });
    Some(Actor {
        sub,
        act: trimmed(actor.act),
        scopes,
    })
}

fn normalize_auth_context(auth: AuthContext) -> Result<Option<AuthContext>, SecurityViolation> {
    let method = match trimmed(Some(String::from(auth.method))) {
        Some(method) => AuthMethod::from(method),
        None => return Ok(None),
    };
    let token_ref = trimmed(auth.token_ref);
    if let Some(token_ref) = &token_ref {
        if let Err(violation) = check_token_ref("auth_context.token_ref", token_ref) {
            warn!(rule = violation.rule, "rejected raw credential in token_ref");
            return Err(violation);
        }
    }
    Ok(Some(AuthContext { method, token_ref }))
}

fn normalize_signature(
    signature: Signature,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Signature> {
    let alg = trimmed(Some(String::from(signature.alg)));
    let kid = trimmed(Some(signature.kid));
    let value = trimmed(Some(signature.value));
    for (path, field) in [
        ("signature.alg", alg.is_none()),
        ("signature.kid", kid.is_none()),
        ("signature.value", value.is_none()),
    ] {
        if field {
            issues.push(ValidationIssue::new(path, IssueCode::Required, "must not be blank"));
        }
    }
    Some(Signature {
        alg: SignatureAlg::from(alg?),
        kid: kid?,
        value: value?,
    })
}
