//! CLI error type.

use missive_canonical::CanonicalizationError;
use missive_core::EnvelopeError;
use missive_signing::SigningError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Io(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("canonicalization failed: {0}")]
    Canonical(#[from] CanonicalizationError),
    #[error("{0}")]
    Envelope(#[from] EnvelopeError),
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),
    #[error("configuration: {0}")]
    Config(String),
    /// Checked input was rejected; the details were already printed.
    #[error("{0}")]
    Rejected(String),
}

impl CliError {
    /// 2 for security rejections, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Envelope(EnvelopeError::Security(_)) => 2,
            _ => 1,
        }
    }
}
