//! Canonical data primitives for Missive envelopes.
//!
//! Everything that participates in hashing or signing lives in this crate:
//! the canonical encoder, the digest type used for idempotency keys, the
//! time-sortable identifier generator and the format patterns shared by the
//! normalizer and validator.
//!
//! The canonical encoding is versioned implicitly through the envelope
//! `specversion`; any change to [`canonicalizer`] invalidates previously
//! issued idempotency keys and signatures.
#![deny(missing_docs)]

/// Canonicalization helpers for deterministic hashing and signing.
pub mod canonicalizer;
/// Digest primitives (`sha256:<hex>`).
pub mod digest;
/// Format patterns for envelope fields.
pub mod identifiers;
/// UTC timestamp formatting and round-trip checks.
pub mod time;
/// Time-sortable identifier generation.
pub mod ulid;

pub use canonicalizer::{
    canonical_bytes, canonicalize, CanonicalizationError, Canonicalizer, MAX_DEPTH,
};
pub use digest::{Digest, DigestAlg};
pub use identifiers::{is_event_type, is_source, is_traceparent};
pub use time::{format_timestamp, is_round_trip_utc, now_timestamp};
pub use ulid::{generate_id, new_id, ID_ALPHABET, ID_LEN};
