use sha2::{Digest as Sha2Digest, Sha256};

use std::fmt;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlg {
    /// SHA-256, written as the `sha256:` prefix.
    Sha256,
}

impl DigestAlg {
    /// Prefix used in the textual form.
    pub fn prefix(&self) -> &'static str {
        match self {
            DigestAlg::Sha256 => "sha256",
        }
    }
}

/// Algorithm + lowercase hex digest, written as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    alg: DigestAlg,
    hex: String,
}

impl Digest {
    /// Hashes `bytes` with SHA-256.
    pub fn sha256(bytes: &[u8]) -> Self {
        let hash = Sha256::digest(bytes);
        Digest {
            alg: DigestAlg::Sha256,
            hex: hex::encode(hash),
        }
    }

    /// Lowercase hex digest bytes.
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alg.prefix(), self.hex)
    }
}
