//! Envelope model, normalization, validation and parsing for Missive.
//!
//! This crate provides:
//! - [`MessageEnvelope`], the wire record every event, command and reply carries
//! - [`normalize`], the single constructor that applies defaults, derives the
//!   idempotency key and rejects raw credentials
//! - [`validate`], a side-effect-free structural check returning every issue
//! - [`parse`], the entry point for untrusted input
//! - intention-revealing factories ([`create_event`], [`create_error_reply`], ...)
//!
//! Core invariants:
//! - `idempotency_key` is a pure function of `{type, source, subject, correlation_id, data}`
//! - a constructed envelope always passes [`validate`]
//! - `auth_context.token_ref` never holds a raw credential
//!
#![deny(missing_docs)]

/// Envelope types and helpers.
pub mod envelope;
/// Error types for envelope operations.
pub mod errors;
/// Intention-revealing constructors.
pub mod factory;
/// Idempotency key derivation.
pub mod idempotency;
/// Creation requests accepted by the normalizer.
pub mod input;
/// The normalizing constructor.
pub mod normalize;
/// Parsing of untrusted input.
pub mod parse;
/// Raw credential detection.
pub mod security;
/// Structural validation.
pub mod validate;

pub use envelope::{
    Actor, AuthContext, AuthMethod, MessageEnvelope, Signature, SignatureAlg,
    DEFAULT_CONTENT_TYPE, SPEC_VERSION,
};
pub use errors::{EnvelopeError, IssueCode, SecurityViolation, ValidationIssue, ValidationIssues};
pub use factory::{
    create_command, create_error_reply, create_event, create_reply, ErrorReply, ERROR_REPLY_TYPE,
};
pub use idempotency::derive_idempotency_key;
pub use input::EnvelopeInput;
pub use normalize::{normalize, normalize_at};
pub use parse::{parse, parse_value};
pub use security::{detect_raw_token, DENYLIST_VERSION};
pub use validate::{validate, ValidationReport};
