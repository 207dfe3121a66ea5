//! Raw credential detection for token reference fields.
//!
//! The denylist is plain data so it can be audited and extended without
//! touching normalization. Bump [`DENYLIST_VERSION`] whenever a rule changes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SecurityViolation;

/// Version of the rule table below.
pub const DENYLIST_VERSION: u32 = 1;

/// `(rule name, pattern)` pairs. A token reference matching any of them is a
/// raw credential.
const RULES: &[(&str, &str)] = &[
    ("jwt", r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$"),
    ("bearer", r"(?i)^bearer\s+\S+"),
    ("basic", r"(?i)^basic\s+[A-Za-z0-9+/]+=*$"),
    ("pem_private_key", r"-----BEGIN [A-Z ]*PRIVATE KEY-----"),
    ("aws_access_key", r"^(AKIA|ASIA)[0-9A-Z]{16}$"),
    ("github_token", r"^(ghp|gho|ghu|ghs|ghr|github_pat)_[A-Za-z0-9_]{20,}$"),
    ("slack_token", r"^xox[abprs]-[A-Za-z0-9-]{10,}$"),
    ("secret_key", r"^sk_(live|test)_[A-Za-z0-9]{16,}$"),
];

static COMPILED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).expect("invalid regex")))
        .collect()
});

/// Name of the first rule `value` matches, if any.
pub fn detect_raw_token(value: &str) -> Option<&'static str> {
    COMPILED
        .iter()
        .find(|(_, re)| re.is_match(value))
        .map(|(name, _)| *name)
}

/// Rejects `value` at `path` when it looks like a raw credential.
pub fn check_token_ref(path: &str, value: &str) -> Result<(), SecurityViolation> {
    match detect_raw_token(value) {
        Some(rule) => Err(SecurityViolation {
            path: path.to_string(),
            rule,
        }),
        None => Ok(()),
    }
}
