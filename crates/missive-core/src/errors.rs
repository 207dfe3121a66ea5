use missive_canonical::CanonicalizationError;
use serde::Serialize;
use thiserror::Error;

use std::fmt;

/// Stable issue codes reported by normalization and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required field is missing or blank.
    Required,
    /// A field has the wrong JSON type.
    InvalidType,
    /// A field does not match its format.
    InvalidFormat,
    /// A field holds a value outside its allowed set.
    InvalidValue,
    /// A numeric field is out of range.
    OutOfRange,
    /// A list is not sorted and de-duplicated.
    NotNormalized,
    /// A field holds something that looks like a raw credential.
    Forbidden,
}

impl IssueCode {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::InvalidType => "invalid_type",
            IssueCode::InvalidFormat => "invalid_format",
            IssueCode::InvalidValue => "invalid_value",
            IssueCode::OutOfRange => "out_of_range",
            IssueCode::NotNormalized => "not_normalized",
            IssueCode::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural problem, addressed by a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field path, like `actor.sub`.
    pub path: String,
    /// Stable code.
    pub code: IssueCode,
    /// Human-readable message. Never contains the offending value for
    /// credential-bearing fields.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue.
    pub fn new(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.code)
    }
}

/// Non-empty list of issues carried by [`EnvelopeError::Validation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationIssues(Vec<ValidationIssue>);

impl ValidationIssues {
    /// Wraps a list of issues.
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self(issues)
    }

    /// Borrowed issues.
    pub fn as_slice(&self) -> &[ValidationIssue] {
        &self.0
    }

    /// Owned issues.
    pub fn into_vec(self) -> Vec<ValidationIssue> {
        self.0
    }

    /// True when some issue is reported for `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.0.iter().any(|issue| issue.path == path)
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

/// A raw credential was found where only a reference is allowed.
///
/// Carries the field path and the denylist rule, never the value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path} looks like a raw credential (rule `{rule}`); only references are accepted")]
pub struct SecurityViolation {
    /// Field path, like `auth_context.token_ref`.
    pub path: String,
    /// Name of the matching denylist rule.
    pub rule: &'static str,
}

/// Errors produced while constructing, parsing or signing envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Structural or format problems.
    #[error("invalid envelope: {0}")]
    Validation(ValidationIssues),
    /// Raw credential detected. Retrying with the same input never succeeds.
    #[error("security violation: {0}")]
    Security(#[from] SecurityViolation),
    /// Input was not a structured record, or encoding failed internally.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl EnvelopeError {
    /// Wraps issues into a validation error.
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        EnvelopeError::Validation(ValidationIssues::new(issues))
    }

    /// Issues for validation errors, empty otherwise.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            EnvelopeError::Validation(issues) => issues.as_slice(),
            _ => &[],
        }
    }

    /// False for security errors.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, EnvelopeError::Security(_))
    }
}

impl From<CanonicalizationError> for EnvelopeError {
    fn from(err: CanonicalizationError) -> Self {
        EnvelopeError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(err: serde_json::Error) -> Self {
        EnvelopeError::Serialization(err.to_string())
    }
}
