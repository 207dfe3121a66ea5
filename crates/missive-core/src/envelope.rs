use chrono::{DateTime, Duration, Utc};
use missive_canonical::{canonical_bytes, CanonicalizationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::fmt;

use crate::input::EnvelopeInput;

/// Envelope format version. Also versions the canonical encoding.
pub const SPEC_VERSION: &str = "1.0";

/// Default `datacontenttype`.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// How the producer authenticated.
///
/// Strings outside the known set deserialize to [`AuthMethod::Other`], which
/// validation rejects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthMethod {
    /// Mutual TLS.
    MTls,
    /// Bearer JWT.
    Jwt,
    /// Mutual TLS plus JWT.
    MTlsJwt,
    /// Static API key.
    ApiKey,
    /// Method not known to the producer.
    Unknown,
    /// Unrecognized method string.
    Other(String),
}

impl AuthMethod {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            AuthMethod::MTls => "mTLS",
            AuthMethod::Jwt => "JWT",
            AuthMethod::MTlsJwt => "mTLS+JWT",
            AuthMethod::ApiKey => "API_KEY",
            AuthMethod::Unknown => "UNKNOWN",
            AuthMethod::Other(s) => s,
        }
    }

    /// True for the five methods the envelope format defines.
    pub fn is_known(&self) -> bool {
        !matches!(self, AuthMethod::Other(_))
    }
}

impl From<String> for AuthMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "mTLS" => AuthMethod::MTls,
            "JWT" => AuthMethod::Jwt,
            "mTLS+JWT" => AuthMethod::MTlsJwt,
            "API_KEY" => AuthMethod::ApiKey,
            "UNKNOWN" => AuthMethod::Unknown,
            _ => AuthMethod::Other(value),
        }
    }
}

impl From<&str> for AuthMethod {
    fn from(value: &str) -> Self {
        AuthMethod::from(value.to_string())
    }
}

impl From<AuthMethod> for String {
    fn from(value: AuthMethod) -> Self {
        match value {
            AuthMethod::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature algorithm named in a signature block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignatureAlg {
    /// Ed25519.
    EdDsa,
    /// ECDSA over P-256 with SHA-256.
    Es256,
    /// HMAC-SHA256.
    Hs256,
    /// Unrecognized algorithm string.
    Other(String),
}

impl SignatureAlg {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            SignatureAlg::EdDsa => "EdDSA",
            SignatureAlg::Es256 => "ES256",
            SignatureAlg::Hs256 => "HS256",
            SignatureAlg::Other(s) => s,
        }
    }

    /// True for EdDSA, ES256 and HS256.
    pub fn is_known(&self) -> bool {
        !matches!(self, SignatureAlg::Other(_))
    }
}

impl From<String> for SignatureAlg {
    fn from(value: String) -> Self {
        match value.as_str() {
            "EdDSA" => SignatureAlg::EdDsa,
            "ES256" => SignatureAlg::Es256,
            "HS256" => SignatureAlg::Hs256,
            _ => SignatureAlg::Other(value),
        }
    }
}

impl From<&str> for SignatureAlg {
    fn from(value: &str) -> Self {
        SignatureAlg::from(value.to_string())
    }
}

impl From<SignatureAlg> for String {
    fn from(value: SignatureAlg) -> Self {
        match value {
            SignatureAlg::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SignatureAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal on whose behalf the envelope was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Subject identifier.
    pub sub: String,
    /// Acting party when delegated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act: Option<String>,
    /// Granted scopes, unique and sorted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl Actor {
    /// Actor with only a subject.
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            act: None,
            scopes: None,
        }
    }
}

/// Authentication context of the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authentication method.
    pub method: AuthMethod,
    /// Reference to a credential (for example a vault path), never the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ref: Option<String>,
}

/// Detached signature over the canonical envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Algorithm.
    pub alg: SignatureAlg,
    /// Key identifier.
    pub kid: String,
    /// Encoded signature bytes.
    pub value: String,
}

/// Normalized, versioned wrapper around a business payload.
///
/// Construct with [`crate::normalize`] or a factory. Editing any field of a
/// signed envelope invalidates its signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope<D = Value> {
    /// Envelope format version.
    pub specversion: String,
    /// Unique identifier of this instance.
    pub id: String,
    /// Dotted event type, like `order.created`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Producer name, like `svc.orders`.
    pub source: String,
    /// Optional subject within the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// UTC production time, `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub time: String,
    /// Media type of `data`.
    pub datacontenttype: String,
    /// Absolute http(s) URL of the payload schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataschema: Option<String>,
    /// W3C `traceparent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceparent: Option<String>,
    /// W3C `tracestate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracestate: Option<String>,
    /// Groups a causal chain of envelopes.
    pub correlation_id: String,
    /// Id of the envelope that caused this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    /// Tenant partition hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Acting principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Actor>,
    /// Producer authentication context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_context: Option<AuthContext>,
    /// Duplicate-detection key.
    pub idempotency_key: String,
    /// Time to live in seconds, interpreted by consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_sec: Option<i64>,
    /// Delivery attempt counter.
    #[serde(default)]
    pub retry_count: i64,
    /// Signature block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    /// Business payload.
    pub data: D,
}

impl<D> MessageEnvelope<D> {
    /// True when a signature block is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Copy with `signature` removed.
    pub fn unsigned(&self) -> Self
    where
        D: Clone,
    {
        Self {
            signature: None,
            ..self.clone()
        }
    }

    /// Copy for redelivery: `retry_count` incremented and signature dropped,
    /// so the result must be re-signed.
    pub fn with_retry(&self) -> Self
    where
        D: Clone,
    {
        Self {
            retry_count: self.retry_count.saturating_add(1),
            signature: None,
            ..self.clone()
        }
    }

    /// Instant after which consumers should discard the envelope, if it
    /// carries a TTL and a parseable time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = self.ttl_sec?;
        let produced = DateTime::parse_from_rfc3339(&self.time).ok()?;
        produced
            .with_timezone(&Utc)
            .checked_add_signed(Duration::try_seconds(ttl)?)
    }

    /// True when the TTL has elapsed at `now`. Envelopes without TTL never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }

    /// Creation request for an envelope caused by this one. Correlation,
    /// tenant and trace context are inherited; `causation_id` is this `id`.
    pub fn child_input<C>(
        &self,
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: C,
    ) -> EnvelopeInput<C> {
        let mut input = EnvelopeInput::new(event_type, source, data)
            .correlation_id(self.correlation_id.clone())
            .causation_id(self.id.clone());
        input.tenant_id = self.tenant_id.clone();
        input.traceparent = self.traceparent.clone();
        input.tracestate = self.tracestate.clone();
        input
    }
}

impl<D: Serialize> MessageEnvelope<D> {
    /// Canonical bytes of the envelope with `signature` absent. This is what
    /// gets signed and verified.
    pub fn signing_payload(&self) -> Result<Vec<u8>, CanonicalizationError> {
        let mut value = serde_json::to_value(self)
            .map_err(|err| CanonicalizationError::InvalidStructure(err.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.remove("signature");
        }
        canonical_bytes(&value)
    }
}
