//! Time-sortable identifiers.
//!
//! Identifiers are 26 characters of Crockford base-32: 10 characters of
//! millisecond timestamp (most significant first) followed by 16 characters
//! encoding 80 bits from the operating system CSPRNG.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

/// Crockford base-32 alphabet (no I, L, O, U).
pub const ID_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of a generated identifier.
pub const ID_LEN: usize = 26;

const TIME_LEN: usize = 10;
const RANDOM_LEN: usize = 16;

/// Generates an identifier for the given Unix time in milliseconds.
///
/// Timestamps beyond 50 bits are truncated to their low 50 bits.
pub fn generate_id(now_millis: u64) -> String {
    let mut random = [0u8; 10];
    OsRng.fill_bytes(&mut random);
    encode(now_millis, &random)
}

/// Generates an identifier for the current instant.
pub fn new_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    generate_id(millis)
}

fn encode(now_millis: u64, random: &[u8; 10]) -> String {
    let mut out = [0u8; ID_LEN];

    let mut time = now_millis;
    for slot in out[..TIME_LEN].iter_mut().rev() {
        *slot = ID_ALPHABET[(time & 0x1f) as usize];
        time >>= 5;
    }

    let mut bits = random.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b));
    for slot in out[TIME_LEN..TIME_LEN + RANDOM_LEN].iter_mut().rev() {
        *slot = ID_ALPHABET[(bits & 0x1f) as usize];
        bits >>= 5;
    }

    out.iter().map(|b| *b as char).collect()
}
