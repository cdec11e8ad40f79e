//! Short key generation and format checks.
//!
//! Keys are derived from a SHA-256 digest of the destination URL, a nanosecond
//! timestamp and a random salt, rendered in base-62 and shaped as `XXXX-XXXX`.
//! Generation needs no coordination between processes; uniqueness is enforced
//! by the persistence store's unique constraint.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fmt;

/// Base-62 alphabet, digits first, then lowercase, then uppercase.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Characters per hyphen-separated group.
const GROUP_LEN: usize = 4;

/// Base-62 characters taken from the digest.
const KEY_CHARS: usize = GROUP_LEN * 2;

/// Bytes of OS randomness mixed into every hash input.
const SALT_BYTES: usize = 4;

/// A well-formed short key such as `a1B2-c3D4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortKey(String);

impl ShortKey {
    /// Total length of a short key, hyphen included.
    pub const LEN: usize = KEY_CHARS + 1;

    /// Parses a string, accepting only the `XXXX-XXXX` base-62 shape.
    pub fn parse(input: &str) -> Option<Self> {
        Self::is_well_formed(input).then(|| Self(input.to_string()))
    }

    pub fn is_well_formed(input: &str) -> bool {
        let bytes = input.as_bytes();
        bytes.len() == Self::LEN
            && bytes.iter().enumerate().all(|(i, b)| {
                if i == GROUP_LEN {
                    *b == b'-'
                } else {
                    b.is_ascii_alphanumeric()
                }
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Shapes a digest into a key: base-62, first 8 symbols, left-padded
    /// with `'0'` when the encoding is shorter, split into two groups.
    pub fn from_digest(digest: &[u8]) -> Self {
        let encoded = to_base62(digest);
        let head: String = encoded.chars().take(KEY_CHARS).collect();
        let padded = format!("{:0>width$}", head, width = KEY_CHARS);

        Self(format!("{}-{}", &padded[..GROUP_LEN], &padded[GROUP_LEN..]))
    }
}

impl fmt::Display for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Produces salted, timestamped short keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator;

impl KeyGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Mints a key for `seed`, normally the destination URL.
    ///
    /// Two calls with the same seed produce different keys with overwhelming
    /// probability, and the key cannot be reversed to the seed.
    pub fn generate(&self, seed: &str) -> ShortKey {
        let timestamp = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros());
        let salt = random_salt();

        let digest = Sha256::digest(format!("{}:{}:{}", seed, timestamp, salt).as_bytes());

        ShortKey::from_digest(&digest)
    }
}

/// Hex-encoded salt from the OS random source.
///
/// Falls back to the sub-second clock if the OS source is unavailable; the
/// timestamp already decorrelates calls, and uniqueness is enforced on insert.
fn random_salt() -> String {
    let mut buffer = [0u8; SALT_BYTES];

    if let Err(e) = getrandom::fill(&mut buffer) {
        tracing::warn!("OS random source unavailable, using clock salt: {}", e);
        buffer = Utc::now().timestamp_subsec_nanos().to_be_bytes();
    }

    hex::encode(buffer)
}

/// Encodes a big-endian unsigned integer in base-62, most significant first.
///
/// Zero (including an empty slice) encodes as an empty string.
fn to_base62(bytes: &[u8]) -> String {
    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
    let mut digits = Vec::with_capacity(bytes.len() * 2);

    while !number.is_empty() {
        let mut remainder: u32 = 0;
        let mut quotient = Vec::with_capacity(number.len());

        for byte in &number {
            let acc = (remainder << 8) | u32::from(*byte);
            let q = (acc / 62) as u8;
            remainder = acc % 62;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q);
            }
        }

        digits.push(ALPHABET[remainder as usize]);
        number = quotient;
    }

    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_key_shape(key: &str) {
        assert_eq!(key.len(), 9, "unexpected length for {key}");
        assert_eq!(&key[4..5], "-");
        assert!(
            key.chars()
                .enumerate()
                .all(|(i, c)| if i == 4 { c == '-' } else { c.is_ascii_alphanumeric() })
        );
    }

    #[test]
    fn test_generate_has_key_shape() {
        let generator = KeyGenerator::new();
        for seed in ["https://example.com", "x", "https://例え.jp/パス", " "] {
            let key = generator.generate(seed);
            assert_key_shape(key.as_str());
            assert!(ShortKey::is_well_formed(key.as_str()));
        }
    }

    #[test]
    fn test_generate_same_url_produces_distinct_keys() {
        let generator = KeyGenerator::new();
        let keys: HashSet<_> = (0..1000)
            .map(|_| generator.generate("https://example.com/same"))
            .collect();

        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_from_digest_pads_zero_digest() {
        let key = ShortKey::from_digest(&[0u8; 32]);
        assert_eq!(key.as_str(), "0000-0000");
    }

    #[test]
    fn test_from_digest_pads_short_encoding_on_the_left() {
        let mut digest = [0u8; 32];
        digest[31] = 61;
        assert_eq!(ShortKey::from_digest(&digest).as_str(), "0000-000Z");

        // 62 * 62 + 1 = 3845 encodes as "101"
        digest[30] = 0x0F;
        digest[31] = 0x05;
        assert_eq!(ShortKey::from_digest(&digest).as_str(), "0000-0101");
    }

    #[test]
    fn test_from_digest_takes_most_significant_symbols() {
        let key = ShortKey::from_digest(&[0xFF; 32]);
        let full = to_base62(&[0xFF; 32]);

        assert!(full.len() > 8);
        assert_eq!(key.as_str(), format!("{}-{}", &full[..4], &full[4..8]));
    }

    #[test]
    fn test_to_base62_small_values() {
        assert_eq!(to_base62(&[]), "");
        assert_eq!(to_base62(&[0]), "");
        assert_eq!(to_base62(&[9]), "9");
        assert_eq!(to_base62(&[10]), "a");
        assert_eq!(to_base62(&[36]), "A");
        assert_eq!(to_base62(&[62]), "10");
        assert_eq!(to_base62(&[0x01, 0x00]), "48");
    }

    #[test]
    fn test_parse_accepts_well_formed_keys() {
        assert!(ShortKey::parse("a1B2-c3D4").is_some());
        assert!(ShortKey::parse("0000-ZZZZ").is_some());
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for input in ["", "a1B2c3D4", "a1B2-c3D", "a1B2-c3D45", "a1B2_c3D4", "a1B2-c3D!", "a1B-2c3D4"] {
            assert!(ShortKey::parse(input).is_none(), "{input} should be rejected");
        }
    }
}
