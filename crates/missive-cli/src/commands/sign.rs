//! Sign command implementation.

use missive_core::SignatureAlg;
use missive_signing::{sign, SignatureEncoding, SignerConfig, SigningKey};

use crate::error::CliError;
use crate::input::{read_envelope, read_text};
use crate::keyring::known_alg;
use crate::output::format_json;
use crate::EncodingArg;

pub fn run(
    input: Option<String>,
    alg: String,
    kid: String,
    secret: Option<String>,
    key_file: Option<String>,
    encoding: EncodingArg,
) -> Result<(), CliError> {
    let alg = known_alg(&alg)?;
    let key = match (&alg, secret, key_file) {
        (SignatureAlg::Hs256, Some(secret), None) => SigningKey::Hs256(
            missive_signing::HmacSecret::new(secret.into_bytes()),
        ),
        (_, None, Some(path)) => SigningKey::from_base64(&alg, &read_text(Some(&path))?)?,
        (SignatureAlg::Hs256, _, _) => {
            return Err(CliError::Config(
                "HS256 needs exactly one of --secret or --key-file".into(),
            ))
        }
        _ => return Err(CliError::Config(format!("{} needs --key-file", alg))),
    };

    let encoding = match encoding {
        EncodingArg::Base64url => SignatureEncoding::Base64Url,
        EncodingArg::Base64 => SignatureEncoding::Base64,
    };
    let config = SignerConfig::new(kid, key).with_encoding(encoding);

    let envelope = read_envelope(input.as_deref())?;
    let signed = sign(&envelope, &config)?;
    println!("{}", format_json(&signed)?);
    Ok(())
}
