use std::fmt;
use std::sync::Arc;

use missive_core::{MessageEnvelope, SignatureAlg};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::encoding::SignatureEncoding;
use crate::errors::VerificationFailure;
use crate::keys::{KeyResolver, KeyTable, VerificationKey};
use crate::sign::hmac_sha256;

/// Key lookup and policy for [`verify`].
#[derive(Clone)]
pub struct VerifierConfig {
    resolver: Arc<dyn KeyResolver>,
    allowed_algs: Option<Vec<SignatureAlg>>,
    encoding: SignatureEncoding,
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("allowed_algs", &self.allowed_algs)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl VerifierConfig {
    /// Verifier backed by a static key table.
    pub fn with_keys(keys: KeyTable) -> Self {
        Self::with_resolver(keys)
    }

    /// Verifier backed by a caller-supplied resolver.
    pub fn with_resolver(resolver: impl KeyResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
            allowed_algs: None,
            encoding: SignatureEncoding::default(),
        }
    }

    /// Single-key verifier.
    pub fn single(kid: impl Into<String>, key: VerificationKey) -> Self {
        let mut keys = KeyTable::new();
        keys.insert(kid, key);
        Self::with_keys(keys)
    }

    /// Restricts accepted algorithms. Signatures using any other algorithm
    /// fail regardless of cryptographic validity.
    pub fn allow_algs(mut self, algs: impl IntoIterator<Item = SignatureAlg>) -> Self {
        self.allowed_algs = Some(algs.into_iter().collect());
        self
    }

    /// Encoding tried first when decoding `signature.value`.
    pub fn prefer_encoding(mut self, encoding: SignatureEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn allows(&self, alg: &SignatureAlg) -> bool {
        self.allowed_algs
            .as_ref()
            .map_or(true, |algs| algs.contains(alg))
    }
}

/// True when the envelope carries a valid signature from a known key.
///
/// Never fails: every problem yields `false`. Use [`verify_detailed`] to
/// learn why.
///
/// Pass the envelope exactly as received, deserialized without
/// normalization. [`missive_core::parse`] trims fields and drops blank
/// blocks, which changes the signed bytes and can make an edited document
/// verify.
pub fn verify<D: Serialize>(envelope: &MessageEnvelope<D>, config: &VerifierConfig) -> bool {
    match verify_detailed(envelope, config) {
        Ok(()) => true,
        Err(failure) => {
            warn!(envelope_id = %envelope.id, reason = %failure, "signature rejected");
            false
        }
    }
}

/// Same checks as [`verify`], reporting the first failure. The same
/// as-received requirement applies.
pub fn verify_detailed<D: Serialize>(
    envelope: &MessageEnvelope<D>,
    config: &VerifierConfig,
) -> Result<(), VerificationFailure> {
    let signature = envelope
        .signature
        .as_ref()
        .ok_or(VerificationFailure::Unsigned)?;
    if !signature.alg.is_known() {
        return Err(VerificationFailure::UnsupportedAlg(
            signature.alg.as_str().to_string(),
        ));
    }
    if !config.allows(&signature.alg) {
        return Err(VerificationFailure::AlgNotAllowed(
            signature.alg.as_str().to_string(),
        ));
    }
    let key = config
        .resolver
        .resolve(&signature.kid, &signature.alg)
        .ok_or_else(|| VerificationFailure::UnknownKid(signature.kid.clone()))?;
    if key.alg() != signature.alg {
        return Err(VerificationFailure::KeyMismatch {
            kid: signature.kid.clone(),
            alg: signature.alg.as_str().to_string(),
        });
    }

    let raw = config
        .encoding
        .decode_tolerant(signature.value.trim())
        .ok_or(VerificationFailure::Malformed)?;
    let payload = envelope
        .signing_payload()
        .map_err(|err| VerificationFailure::Payload(err.to_string()))?;

    check(&key, &payload, &raw)
}

fn check(key: &VerificationKey, payload: &[u8], raw: &[u8]) -> Result<(), VerificationFailure> {
    match key {
        VerificationKey::EdDsa(key) => {
            let signature = ed25519_dalek::Signature::from_slice(raw)
                .map_err(|_| VerificationFailure::Malformed)?;
            key.verify_strict(payload, &signature)
                .map_err(|_| VerificationFailure::Mismatch)
        }
        VerificationKey::Es256(key) => {
            use p256::ecdsa::signature::Verifier;
            let signature = p256::ecdsa::Signature::from_der(raw)
                .or_else(|_| p256::ecdsa::Signature::from_slice(raw))
                .map_err(|_| VerificationFailure::Malformed)?;
            key.verify(payload, &signature)
                .map_err(|_| VerificationFailure::Mismatch)
        }
        VerificationKey::Hs256(secret) => {
            let expected = hmac_sha256(secret.expose(), payload)
                .map_err(|_| VerificationFailure::Mismatch)?;
            if raw.len() != expected.len() {
                return Err(VerificationFailure::Mismatch);
            }
            if bool::from(expected[..].ct_eq(raw)) {
                Ok(())
            } else {
                Err(VerificationFailure::Mismatch)
            }
        }
    }
}
