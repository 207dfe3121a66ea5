use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use missive_core::SignatureAlg;
use p256::ecdsa;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use std::collections::HashMap;
use std::fmt;

use crate::errors::SigningError;

/// Shared HMAC secret, wiped on drop and redacted in debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacSecret(Vec<u8>);

impl HmacSecret {
    /// Wraps secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HmacSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacSecret([REDACTED; {}])", self.0.len())
    }
}

/// Private half used by the signer; the variant selects the algorithm.
#[derive(Clone)]
pub enum SigningKey {
    /// Ed25519 signing key.
    EdDsa(ed25519_dalek::SigningKey),
    /// P-256 ECDSA signing key.
    Es256(ecdsa::SigningKey),
    /// HMAC-SHA256 secret.
    Hs256(HmacSecret),
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({})", self.alg())
    }
}

impl SigningKey {
    /// Algorithm written into signature blocks.
    pub fn alg(&self) -> SignatureAlg {
        match self {
            SigningKey::EdDsa(_) => SignatureAlg::EdDsa,
            SigningKey::Es256(_) => SignatureAlg::Es256,
            SigningKey::Hs256(_) => SignatureAlg::Hs256,
        }
    }

    /// Fresh random key for `alg`.
    pub fn generate(alg: &SignatureAlg) -> Result<Self, SigningError> {
        match alg {
            SignatureAlg::EdDsa => Ok(SigningKey::EdDsa(ed25519_dalek::SigningKey::generate(
                &mut OsRng,
            ))),
            SignatureAlg::Es256 => Ok(SigningKey::Es256(ecdsa::SigningKey::random(&mut OsRng))),
            SignatureAlg::Hs256 => {
                let mut secret = vec![0u8; 32];
                rand::RngCore::fill_bytes(&mut OsRng, &mut secret);
                Ok(SigningKey::Hs256(HmacSecret::new(secret)))
            }
            SignatureAlg::Other(name) => Err(SigningError::UnsupportedAlg(name.clone())),
        }
    }

    /// Decodes standard base64 key bytes: a 32-byte Ed25519 seed, a 32-byte
    /// P-256 scalar, or raw HMAC secret bytes.
    pub fn from_base64(alg: &SignatureAlg, encoded: &str) -> Result<Self, SigningError> {
        let bytes = decode_key(encoded)?;
        match alg {
            SignatureAlg::EdDsa => {
                let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    SigningError::InvalidKey("Ed25519 seed must be 32 bytes".into())
                })?;
                Ok(SigningKey::EdDsa(ed25519_dalek::SigningKey::from_bytes(&seed)))
            }
            SignatureAlg::Es256 => ecdsa::SigningKey::from_slice(&bytes)
                .map(SigningKey::Es256)
                .map_err(|err| SigningError::InvalidKey(err.to_string())),
            SignatureAlg::Hs256 => {
                if bytes.is_empty() {
                    return Err(SigningError::InvalidKey("HMAC secret is empty".into()));
                }
                Ok(SigningKey::Hs256(HmacSecret::new(bytes)))
            }
            SignatureAlg::Other(name) => Err(SigningError::UnsupportedAlg(name.clone())),
        }
    }

    /// Private key bytes, standard base64.
    pub fn to_base64(&self) -> String {
        match self {
            SigningKey::EdDsa(key) => STANDARD.encode(key.to_bytes()),
            SigningKey::Es256(key) => STANDARD.encode(key.to_bytes()),
            SigningKey::Hs256(secret) => STANDARD.encode(secret.expose()),
        }
    }

    /// Matching verification key.
    pub fn verification_key(&self) -> VerificationKey {
        match self {
            SigningKey::EdDsa(key) => VerificationKey::EdDsa(key.verifying_key()),
            SigningKey::Es256(key) => VerificationKey::Es256(*key.verifying_key()),
            SigningKey::Hs256(secret) => VerificationKey::Hs256(secret.clone()),
        }
    }
}

/// Public half (or shared secret) used by the verifier.
#[derive(Clone)]
pub enum VerificationKey {
    /// Ed25519 public key.
    EdDsa(ed25519_dalek::VerifyingKey),
    /// P-256 public key.
    Es256(ecdsa::VerifyingKey),
    /// HMAC-SHA256 secret.
    Hs256(HmacSecret),
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerificationKey({})", self.alg())
    }
}

impl VerificationKey {
    /// Algorithm this key verifies.
    pub fn alg(&self) -> SignatureAlg {
        match self {
            VerificationKey::EdDsa(_) => SignatureAlg::EdDsa,
            VerificationKey::Es256(_) => SignatureAlg::Es256,
            VerificationKey::Hs256(_) => SignatureAlg::Hs256,
        }
    }

    /// Decodes standard base64 key bytes: a 32-byte Ed25519 public key, a
    /// SEC1-encoded P-256 point, or raw HMAC secret bytes.
    pub fn from_base64(alg: &SignatureAlg, encoded: &str) -> Result<Self, SigningError> {
        let bytes = decode_key(encoded)?;
        match alg {
            SignatureAlg::EdDsa => {
                let raw: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    SigningError::InvalidKey("Ed25519 public key must be 32 bytes".into())
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&raw)
                    .map(VerificationKey::EdDsa)
                    .map_err(|err| SigningError::InvalidKey(err.to_string()))
            }
            SignatureAlg::Es256 => ecdsa::VerifyingKey::from_sec1_bytes(&bytes)
                .map(VerificationKey::Es256)
                .map_err(|err| SigningError::InvalidKey(err.to_string())),
            SignatureAlg::Hs256 => {
                if bytes.is_empty() {
                    return Err(SigningError::InvalidKey("HMAC secret is empty".into()));
                }
                Ok(VerificationKey::Hs256(HmacSecret::new(bytes)))
            }
            SignatureAlg::Other(name) => Err(SigningError::UnsupportedAlg(name.clone())),
        }
    }

    /// Public key bytes (uncompressed SEC1 for P-256), standard base64.
    pub fn to_base64(&self) -> String {
        match self {
            VerificationKey::EdDsa(key) => STANDARD.encode(key.to_bytes()),
            VerificationKey::Es256(key) => STANDARD.encode(key.to_encoded_point(false).as_bytes()),
            VerificationKey::Hs256(secret) => STANDARD.encode(secret.expose()),
        }
    }
}

fn decode_key(encoded: &str) -> Result<Vec<u8>, SigningError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|err| SigningError::InvalidKey(format!("key is not base64: {}", err)))
}

/// Resolves the verification key for a `kid`.
///
/// Closures `Fn(&str, &SignatureAlg) -> Option<VerificationKey>` implement
/// this, so hosts can plug in a key service without a wrapper type.
pub trait KeyResolver: Send + Sync {
    /// Key for `kid`, or `None` when unknown.
    fn resolve(&self, kid: &str, alg: &SignatureAlg) -> Option<VerificationKey>;
}

impl<F> KeyResolver for F
where
    F: Fn(&str, &SignatureAlg) -> Option<VerificationKey> + Send + Sync,
{
    fn resolve(&self, kid: &str, alg: &SignatureAlg) -> Option<VerificationKey> {
        self(kid, alg)
    }
}

/// Static `kid` → key lookup table.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    keys: HashMap<String, VerificationKey>,
}

impl KeyTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key, replacing any previous key for `kid`.
    pub fn insert(&mut self, kid: impl Into<String>, key: VerificationKey) -> &mut Self {
        self.keys.insert(kid.into(), key);
        self
    }
}

impl FromIterator<(String, VerificationKey)> for KeyTable {
    fn from_iter<I: IntoIterator<Item = (String, VerificationKey)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl KeyResolver for KeyTable {
    fn resolve(&self, kid: &str, _alg: &SignatureAlg) -> Option<VerificationKey> {
        self.keys.get(kid).cloned()
    }
}
