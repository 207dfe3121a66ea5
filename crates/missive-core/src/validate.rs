use missive_canonical::{is_event_type, is_round_trip_utc, is_source, is_traceparent};
use serde::Serialize;
use url::Url;

use crate::envelope::{MessageEnvelope, SPEC_VERSION};
use crate::errors::{EnvelopeError, IssueCode, ValidationIssue};
use crate::security::detect_raw_token;

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no issue was found.
    pub fn ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Every issue found, in check order.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Converts a failing report into [`EnvelopeError::Validation`].
    pub fn into_result(self) -> Result<(), EnvelopeError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(EnvelopeError::validation(self.issues))
        }
    }

    fn push(&mut self, path: &str, code: IssueCode, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, code, message));
    }

    fn require(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(path, IssueCode::Required, "must not be blank");
        }
    }
}

/// Checks an envelope without side effects, collecting every violation.
///
/// Re-checks invariants the normalizer establishes so hand-built or
/// deserialized envelopes get the same scrutiny.
pub fn validate<D>(envelope: &MessageEnvelope<D>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if envelope.specversion != SPEC_VERSION {
        report.push(
            "specversion",
            IssueCode::InvalidValue,
            format!("must be \"{}\"", SPEC_VERSION),
        );
    }
    report.require("id", &envelope.id);
    if !is_event_type(&envelope.event_type) {
        report.push(
            "type",
            IssueCode::InvalidFormat,
            "must be lowercase dotted segments, at least two",
        );
    }
    if !is_source(&envelope.source) {
        report.push("source", IssueCode::InvalidFormat, "must be lowercase dotted segments");
    }
    if !is_round_trip_utc(&envelope.time) {
        report.push(
            "time",
            IssueCode::InvalidFormat,
            "must be a UTC instant formatted as YYYY-MM-DDTHH:MM:SS.sssZ",
        );
    }
    report.require("datacontenttype", &envelope.datacontenttype);
    report.require("correlation_id", &envelope.correlation_id);
    report.require("idempotency_key", &envelope.idempotency_key);

    if envelope.retry_count < 0 {
        report.push("retry_count", IssueCode::OutOfRange, "must be >= 0");
    }
    if let Some(ttl) = envelope.ttl_sec {
        if ttl <= 0 {
            report.push("ttl_sec", IssueCode::OutOfRange, "must be > 0");
        }
    }
    if let Some(schema) = &envelope.dataschema {
        if !is_http_url(schema) {
            report.push(
                "dataschema",
                IssueCode::InvalidFormat,
                "must be an absolute http(s) URL",
            );
        }
    }
    if let Some(traceparent) = &envelope.traceparent {
        if !is_traceparent(traceparent) {
            report.push(
                "traceparent",
                IssueCode::InvalidFormat,
                "must match W3C trace-context",
            );
        }
    }

    if let Some(actor) = &envelope.actor {
        report.require("actor.sub", &actor.sub);
        if let Some(scopes) = &actor.scopes {
            if !scopes.windows(2).all(|pair| pair[0] < pair[1]) {
                report.push(
                    "actor.scopes",
                    IssueCode::NotNormalized,
                    "must be sorted and unique",
                );
            }
        }
    }

    if let Some(auth) = &envelope.auth_context {
        if !auth.method.is_known() {
            report.push(
                "auth_context.method",
                IssueCode::InvalidValue,
                "must be one of mTLS, JWT, mTLS+JWT, API_KEY, UNKNOWN",
            );
        }
        if let Some(rule) = auth.token_ref.as_deref().and_then(detect_raw_token) {
            report.push(
                "auth_context.token_ref",
                IssueCode::Forbidden,
                format!("looks like a raw credential (rule `{}`)", rule),
            );
        }
    }

    if let Some(signature) = &envelope.signature {
        if !signature.alg.is_known() {
            report.push(
                "signature.alg",
                IssueCode::InvalidValue,
                "must be one of EdDSA, ES256, HS256",
            );
        }
        report.require("signature.kid", &signature.kid);
        report.require("signature.value", &signature.value);
    }

    report
}

fn is_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
