use missive_canonical::CanonicalizationError;
use missive_core::ValidationIssues;
use thiserror::Error;

/// Errors raised while producing a signature.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The envelope failed validation; it must not receive a signature.
    #[error("refusing to sign an invalid envelope: {0}")]
    InvalidEnvelope(ValidationIssues),
    /// The signer was configured without a key id.
    #[error("signer key id must not be blank")]
    MissingKid,
    /// The signing payload could not be built.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// Key bytes were rejected by the algorithm.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
    /// Algorithm name outside EdDSA, ES256, HS256.
    #[error("unsupported signature algorithm `{0}`")]
    UnsupportedAlg(String),
}

/// Why a signature did not verify. Only used for diagnostics; callers of
/// [`crate::verify`] just see `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// No signature block.
    #[error("envelope is not signed")]
    Unsigned,
    /// Algorithm not in EdDSA, ES256, HS256.
    #[error("unsupported algorithm `{0}`")]
    UnsupportedAlg(String),
    /// Algorithm excluded by the verifier allow-list.
    #[error("algorithm `{0}` is not allowed")]
    AlgNotAllowed(String),
    /// No key registered for the kid.
    #[error("no key for kid `{0}`")]
    UnknownKid(String),
    /// Resolved key belongs to another algorithm.
    #[error("key for kid `{kid}` cannot verify {alg}")]
    KeyMismatch {
        /// Key id.
        kid: String,
        /// Algorithm named by the signature.
        alg: String,
    },
    /// Signature value is not base64 or has the wrong shape.
    #[error("malformed signature value")]
    Malformed,
    /// The signing payload could not be rebuilt.
    #[error("payload could not be canonicalized: {0}")]
    Payload(String),
    /// Cryptographic check failed.
    #[error("signature mismatch")]
    Mismatch,
}
