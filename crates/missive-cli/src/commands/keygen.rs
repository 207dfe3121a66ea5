//! Keygen command implementation.

use missive_core::SignatureAlg;
use missive_signing::SigningKey;
use serde_json::json;

use crate::error::CliError;
use crate::keyring::known_alg;
use crate::output::format_json;

pub fn run(alg: String, kid: String) -> Result<(), CliError> {
    let alg = known_alg(&alg)?;
    let key = SigningKey::generate(&alg)?;
    let public = key.verification_key();

    let keyring_field = if alg == SignatureAlg::Hs256 {
        "secret"
    } else {
        "public_key"
    };
    let output = json!({
        "kid": kid,
        "alg": alg.as_str(),
        "private_key": key.to_base64(),
        "keyring_entry": format!(
            "[[keys]]\nkid = \"{}\"\nalg = \"{}\"\n{} = \"{}\"\n",
            kid,
            alg,
            keyring_field,
            public.to_base64()
        ),
    });
    println!("{}", format_json(&output)?);
    Ok(())
}
