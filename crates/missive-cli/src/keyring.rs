//! TOML keyring for `verify`.
//!
//! ```toml
//! allowed_algs = ["EdDSA", "HS256"]
//!
//! [[keys]]
//! kid = "orders-2024"
//! alg = "EdDSA"
//! public_key = "base64..."
//!
//! [[keys]]
//! kid = "shared"
//! alg = "HS256"
//! secret = "base64..."
//! ```

use missive_core::SignatureAlg;
use missive_signing::{KeyTable, VerificationKey, VerifierConfig};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keyring {
    #[serde(default)]
    pub allowed_algs: Option<Vec<String>>,
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEntry {
    pub kid: String,
    pub alg: String,
    /// Base64 public key (EdDSA, ES256).
    #[serde(default)]
    pub public_key: Option<String>,
    /// Base64 shared secret (HS256).
    #[serde(default)]
    pub secret: Option<String>,
}

impl Keyring {
    pub fn load(path: &str) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("failed to read keyring {}: {}", path, e)))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, CliError> {
        toml::from_str(raw).map_err(|e| CliError::Config(format!("invalid keyring: {}", e)))
    }

    pub fn into_verifier(self) -> Result<VerifierConfig, CliError> {
        let mut table = KeyTable::new();
        for entry in self.keys {
            let alg = known_alg(&entry.alg)?;
            let material = match (&alg, entry.public_key, entry.secret) {
                (SignatureAlg::Hs256, None, Some(secret)) => secret,
                (SignatureAlg::EdDsa | SignatureAlg::Es256, Some(public_key), None) => public_key,
                _ => {
                    return Err(CliError::Config(format!(
                        "key `{}`: {} needs exactly one of {}",
                        entry.kid,
                        alg,
                        if alg == SignatureAlg::Hs256 { "secret" } else { "public_key" }
                    )))
                }
            };
            let key = VerificationKey::from_base64(&alg, &material)
                .map_err(|e| CliError::Config(format!("key `{}`: {}", entry.kid, e)))?;
            table.insert(entry.kid, key);
        }
        let mut verifier = VerifierConfig::with_keys(table);
        if let Some(algs) = self.allowed_algs {
            let algs = algs
                .iter()
                .map(|alg| known_alg(alg))
                .collect::<Result<Vec<_>, _>>()?;
            verifier = verifier.allow_algs(algs);
        }
        Ok(verifier)
    }
}

/// Parses an algorithm name, rejecting anything outside the supported set.
pub fn known_alg(name: &str) -> Result<SignatureAlg, CliError> {
    let alg = SignatureAlg::from(name.trim());
    if alg.is_known() {
        Ok(alg)
    } else {
        Err(CliError::Config(format!(
            "unsupported algorithm `{}` (expected EdDSA, ES256 or HS256)",
            name
        )))
    }
}
