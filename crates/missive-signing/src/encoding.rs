use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How signature bytes are written into `signature.value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureEncoding {
    /// URL-safe alphabet, no padding.
    #[default]
    Base64Url,
    /// Standard alphabet with padding.
    Base64,
}

impl SignatureEncoding {
    /// Encodes signature bytes.
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            SignatureEncoding::Base64Url => URL_SAFE_LENIENT.encode(bytes),
            SignatureEncoding::Base64 => STANDARD_LENIENT.encode(bytes),
        }
    }

    /// Decodes with this encoding first, then the other one. Padding is
    /// optional for both, since producers disagree on it.
    pub fn decode_tolerant(&self, value: &str) -> Option<Vec<u8>> {
        let (first, second) = match self {
            SignatureEncoding::Base64Url => (&URL_SAFE_LENIENT, &STANDARD_LENIENT),
            SignatureEncoding::Base64 => (&STANDARD_LENIENT, &URL_SAFE_LENIENT),
        };
        first
            .decode(value)
            .or_else(|_| second.decode(value))
            .ok()
    }
}
