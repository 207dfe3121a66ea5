//! Verify command implementation.

use missive_core::MessageEnvelope;
use missive_signing::{verify_detailed, HmacSecret, VerificationKey, VerifierConfig};

use crate::error::CliError;
use crate::input::read_text;
use crate::keyring::Keyring;

pub fn run(
    input: Option<String>,
    keyring: Option<String>,
    kid: Option<String>,
    secret: Option<String>,
) -> Result<(), CliError> {
    let verifier = match (keyring, kid, secret) {
        (Some(path), _, _) => Keyring::load(&path)?.into_verifier()?,
        (None, Some(kid), Some(secret)) => VerifierConfig::single(
            kid,
            VerificationKey::Hs256(HmacSecret::new(secret.into_bytes())),
        ),
        _ => {
            return Err(CliError::Config(
                "pass --keyring, or --kid with --secret".into(),
            ))
        }
    };

    // Signed bytes must match the document as received, so no normalization.
    let raw = read_text(input.as_deref())?;
    let envelope: MessageEnvelope = serde_json::from_str(&raw)?;
    match verify_detailed(&envelope, &verifier) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(failure) => {
            tracing::warn!(envelope_id = %envelope.id, reason = %failure, "verification failed");
            println!("invalid");
            Err(CliError::Rejected(format!("signature rejected: {}", failure)))
        }
    }
}
