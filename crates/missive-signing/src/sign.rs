use hmac::{Hmac, Mac};
use missive_core::{validate, MessageEnvelope, Signature};
use serde::Serialize;
use sha2::Sha256;
use tracing::debug;

use crate::encoding::SignatureEncoding;
use crate::errors::SigningError;
use crate::keys::SigningKey;

/// Key and presentation options for [`sign`].
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Key id written to `signature.kid`.
    pub kid: String,
    /// Signing key; its variant picks `signature.alg`.
    pub key: SigningKey,
    /// Encoding of `signature.value`.
    pub encoding: SignatureEncoding,
}

impl SignerConfig {
    /// Config with the default URL-safe encoding.
    pub fn new(kid: impl Into<String>, key: SigningKey) -> Self {
        Self {
            kid: kid.into(),
            key,
            encoding: SignatureEncoding::default(),
        }
    }

    /// Ed25519 signer.
    pub fn eddsa(kid: impl Into<String>, key: ed25519_dalek::SigningKey) -> Self {
        Self::new(kid, SigningKey::EdDsa(key))
    }

    /// ECDSA P-256 signer.
    pub fn es256(kid: impl Into<String>, key: p256::ecdsa::SigningKey) -> Self {
        Self::new(kid, SigningKey::Es256(key))
    }

    /// HMAC-SHA256 signer with a shared secret.
    pub fn hs256(kid: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self::new(kid, SigningKey::Hs256(crate::keys::HmacSecret::new(secret)))
    }

    /// Overrides the signature value encoding.
    pub fn with_encoding(mut self, encoding: SignatureEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Signs an envelope, returning a copy with `signature` populated.
///
/// Any existing signature is replaced. The input is left untouched.
///
/// # Errors
///
/// - [`SigningError::InvalidEnvelope`] when the envelope fails validation.
/// - [`SigningError::MissingKid`] when the config carries a blank key id.
/// - [`SigningError::Canonicalization`] when the payload cannot be encoded.
pub fn sign<D>(
    envelope: &MessageEnvelope<D>,
    config: &SignerConfig,
) -> Result<MessageEnvelope<D>, SigningError>
where
    D: Serialize + Clone,
{
    let report = validate(envelope);
    if !report.ok() {
        return Err(SigningError::InvalidEnvelope(
            missive_core::ValidationIssues::new(report.issues().to_vec()),
        ));
    }
    let kid = config.kid.trim();
    if kid.is_empty() {
        return Err(SigningError::MissingKid);
    }

    let payload = envelope.signing_payload()?;
    let raw = signature_bytes(&config.key, &payload)?;
    let alg = config.key.alg();

    debug!(
        envelope_id = %envelope.id,
        alg = %alg,
        kid,
        "signed envelope"
    );

    let mut signed = envelope.clone();
    signed.signature = Some(Signature {
        alg,
        kid: kid.to_string(),
        value: config.encoding.encode(&raw),
    });
    Ok(signed)
}

pub(crate) fn signature_bytes(key: &SigningKey, payload: &[u8]) -> Result<Vec<u8>, SigningError> {
    match key {
        SigningKey::EdDsa(key) => {
            use ed25519_dalek::Signer;
            Ok(key.sign(payload).to_bytes().to_vec())
        }
        SigningKey::Es256(key) => {
            use p256::ecdsa::signature::Signer;
            let signature: p256::ecdsa::Signature = key.sign(payload);
            Ok(signature.to_der().as_bytes().to_vec())
        }
        SigningKey::Hs256(secret) => Ok(hmac_sha256(secret.expose(), payload)?.to_vec()),
    }
}

pub(crate) fn hmac_sha256(secret: &[u8], payload: &[u8]) -> Result<[u8; 32], SigningError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|err| SigningError::InvalidKey(err.to_string()))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().into())
}
