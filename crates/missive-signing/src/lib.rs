//! Signing and verification of Missive envelopes.
//!
//! The signed payload is the canonical encoding of the envelope with the
//! `signature` field absent. Three algorithm families are supported:
//!
//! | alg | key | signature bytes |
//! |---|---|---|
//! | `EdDSA` | Ed25519 | 64-byte signature over the payload |
//! | `ES256` | ECDSA P-256 | DER signature over SHA-256(payload) |
//! | `HS256` | shared secret | HMAC-SHA256(payload) |
//!
//! [`sign`] refuses structurally invalid envelopes. [`verify`] never fails
//! loudly: any problem, including an unknown `kid` or a disallowed
//! algorithm, yields `false`.
#![deny(missing_docs)]

/// Signature value encodings.
pub mod encoding;
/// Error types.
pub mod errors;
/// Key material and key resolution.
pub mod keys;
/// Envelope signing.
pub mod sign;
/// Envelope verification.
pub mod verify;

pub use encoding::SignatureEncoding;
pub use errors::{SigningError, VerificationFailure};
pub use keys::{HmacSecret, KeyResolver, KeyTable, SigningKey, VerificationKey};
pub use sign::{sign, SignerConfig};
pub use verify::{verify, verify_detailed, VerifierConfig};
