//! Parsing of untrusted input.
//!
//! Three outcomes are kept apart: input that is not a JSON object is a
//! serialization error; wrongly typed fields are validation issues collected
//! in one pass; anything the normalizer rejects is surfaced unchanged.

use serde_json::{Map, Value};

use crate::envelope::{Actor, AuthContext, AuthMethod, MessageEnvelope, Signature, SignatureAlg};
use crate::errors::{EnvelopeError, IssueCode, ValidationIssue};
use crate::input::EnvelopeInput;
use crate::normalize::normalize;
use crate::security::check_token_ref;

/// Parses JSON text into a normalized, validated envelope.
pub fn parse(raw: &str) -> Result<MessageEnvelope, EnvelopeError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| EnvelopeError::Serialization(format!("input is not JSON: {}", err)))?;
    parse_value(value)
}

/// Parses an already-decoded JSON value.
pub fn parse_value(value: Value) -> Result<MessageEnvelope, EnvelopeError> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(EnvelopeError::Serialization(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )))
        }
    };
    let input = input_from_object(map)?;
    normalize(input)
}

fn input_from_object(mut map: Map<String, Value>) -> Result<EnvelopeInput, EnvelopeError> {
    let mut fields = Fields::default();

    let mut input = EnvelopeInput::<Value> {
        specversion: fields.string(&mut map, "specversion"),
        id: fields.string(&mut map, "id"),
        event_type: fields.string(&mut map, "type"),
        source: fields.string(&mut map, "source"),
        subject: fields.string(&mut map, "subject"),
        time: fields.string(&mut map, "time"),
        datacontenttype: fields.string(&mut map, "datacontenttype"),
        dataschema: fields.string(&mut map, "dataschema"),
        traceparent: fields.string(&mut map, "traceparent"),
        tracestate: fields.string(&mut map, "tracestate"),
        correlation_id: fields.string(&mut map, "correlation_id"),
        causation_id: fields.string(&mut map, "causation_id"),
        tenant_id: fields.string(&mut map, "tenant_id"),
        idempotency_key: fields.string(&mut map, "idempotency_key"),
        ttl_sec: fields.integer(&mut map, "ttl_sec"),
        retry_count: fields.integer(&mut map, "retry_count"),
        ..EnvelopeInput::default()
    };

    if let Some(mut actor) = fields.object(&mut map, "actor") {
        let sub = fields.string(&mut actor, "actor.sub").unwrap_or_default();
        input.actor = Some(Actor {
            sub,
            act: fields.string(&mut actor, "actor.act"),
            scopes: fields.string_list(&mut actor, "actor.scopes"),
        });
    }
    if let Some(mut auth) = fields.object(&mut map, "auth_context") {
        let method = fields.string(&mut auth, "auth_context.method").unwrap_or_default();
        let token_ref = fields.string(&mut auth, "auth_context.token_ref");
        // Security outranks every type issue collected so far.
        if let Some(token_ref) = token_ref.as_deref().map(str::trim) {
            check_token_ref("auth_context.token_ref", token_ref)?;
        }
        input.auth_context = Some(AuthContext {
            method: AuthMethod::from(method),
            token_ref,
        });
    }
    if let Some(mut signature) = fields.object(&mut map, "signature") {
        input.signature = Some(Signature {
            alg: SignatureAlg::from(
                fields
                    .string(&mut signature, "signature.alg")
                    .unwrap_or_default(),
            ),
            kid: fields
                .string(&mut signature, "signature.kid")
                .unwrap_or_default(),
            value: fields
                .string(&mut signature, "signature.value")
                .unwrap_or_default(),
        });
    }

    // Presence matters, not content: `"data": null` is a payload.
    input.data = map.remove("data");

    if fields.issues.is_empty() {
        Ok(input)
    } else {
        Err(EnvelopeError::validation(fields.issues))
    }
}

/// Typed field extraction that records type mismatches instead of failing.
#[derive(Default)]
struct Fields {
    issues: Vec<ValidationIssue>,
}

impl Fields {
    /// The last path segment is the key; the full path is used for issues.
    fn take(&mut self, map: &mut Map<String, Value>, path: &str) -> Option<Value> {
        let key = path.rsplit('.').next().unwrap_or(path);
        match map.remove(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn mismatch(&mut self, path: &str, expected: &str, found: &Value) {
        self.issues.push(ValidationIssue::new(
            path,
            IssueCode::InvalidType,
            format!("expected {}, got {}", expected, json_type(found)),
        ));
    }

    fn string(&mut self, map: &mut Map<String, Value>, path: &str) -> Option<String> {
        match self.take(map, path)? {
            Value::String(s) => Some(s),
            other => {
                self.mismatch(path, "string", &other);
                None
            }
        }
    }

    /// Integers, integral floats and decimal digit strings are accepted.
    fn integer(&mut self, map: &mut Map<String, Value>, path: &str) -> Option<i64> {
        let value = self.take(map, path)?;
        let parsed = match &value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.mismatch(path, "integer", &value);
        }
        parsed
    }

    fn object(&mut self, map: &mut Map<String, Value>, path: &str) -> Option<Map<String, Value>> {
        match self.take(map, path)? {
            Value::Object(inner) => Some(inner),
            other => {
                self.mismatch(path, "object", &other);
                None
            }
        }
    }

    fn string_list(&mut self, map: &mut Map<String, Value>, path: &str) -> Option<Vec<String>> {
        match self.take(map, path)? {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    match item {
                        Value::String(s) => out.push(s),
                        other => self.mismatch(&format!("{}[{}]", path, idx), "string", &other),
                    }
                }
                Some(out)
            }
            other => {
                self.mismatch(path, "array", &other);
                None
            }
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
