//! Idempotency key derivation.
//!
//! Keys are computed as `sha256:` + hex(sha256(canonical(identity))) where
//! identity is `{type, source, subject?, correlation_id, data}`. The
//! envelope `id` never participates, so redeliveries of the same business
//! event share a key.

use missive_canonical::{canonical_bytes, CanonicalizationError, Digest};
use serde::Serialize;

#[derive(Serialize)]
struct BusinessIdentity<'a, D> {
    #[serde(rename = "type")]
    event_type: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    correlation_id: &'a str,
    data: &'a D,
}

/// Derives the idempotency key for a business identity.
///
/// ```rust
/// use missive_core::derive_idempotency_key;
/// use serde_json::json;
///
/// let data = json!({"orderId": "123"});
/// let key = derive_idempotency_key("order.created", "svc.orders", None, "corr-1", &data)?;
/// assert!(key.starts_with("sha256:"));
/// # Ok::<(), missive_canonical::CanonicalizationError>(())
/// ```
pub fn derive_idempotency_key<D: Serialize>(
    event_type: &str,
    source: &str,
    subject: Option<&str>,
    correlation_id: &str,
    data: &D,
) -> Result<String, CanonicalizationError> {
    let identity = BusinessIdentity {
        event_type,
        source,
        subject,
        correlation_id,
        data,
    };
    let bytes = canonical_bytes(&identity)?;
    Ok(Digest::sha256(&bytes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_ignores_payload_key_order() {
        let a = derive_idempotency_key("a.b", "s", None, "c", &json!({"x": 1, "y": 2})).unwrap();
        let b = derive_idempotency_key("a.b", "s", None, "c", &json!({"y": 2, "x": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_identity_field_participates() {
        let base = derive_idempotency_key("a.b", "s", None, "c", &json!(1)).unwrap();
        let variants = [
            derive_idempotency_key("a.c", "s", None, "c", &json!(1)).unwrap(),
            derive_idempotency_key("a.b", "t", None, "c", &json!(1)).unwrap(),
            derive_idempotency_key("a.b", "s", Some("sub"), "c", &json!(1)).unwrap(),
            derive_idempotency_key("a.b", "s", None, "d", &json!(1)).unwrap(),
            derive_idempotency_key("a.b", "s", None, "c", &json!(2)).unwrap(),
        ];
        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn matches_hash_of_canonical_identity() {
        let key = derive_idempotency_key("a.b", "s", None, "c", &json!({"k": "v"})).unwrap();
        let expected = Digest::sha256(br#"{"correlation_id":"c","data":{"k":"v"},"source":"s","type":"a.b"}"#);
        assert_eq!(key, expected.to_string());
    }
}
