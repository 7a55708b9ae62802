//! Hex text ⇄ raw bytes.
//!
//! The control protocol writes nonces, hashes and cookies as hex. Output is
//! uppercase, which is what the daemon itself emits; input accepts either case.

use crate::error::HexError;

/// Encode `bytes` as uppercase hex.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hex string of either case.
pub fn from_hex(text: &str) -> Result<Vec<u8>, HexError> {
    Ok(hex::decode(text)?)
}

/// True when `text` is non-empty, even-length, and entirely hex digits.
pub fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_uppercase() {
        assert_eq!(to_hex([0x00, 0xab, 0xff]), "00ABFF");
    }

    #[test]
    fn decodes_mixed_case() {
        assert_eq!(from_hex("00aBfF").unwrap(), vec![0x00, 0xab, 0xff]);
    }

    #[test]
    fn rejects_odd_length_and_bad_digits() {
        assert!(from_hex("abc").is_err());
        assert!(from_hex("zz").is_err());
        assert!(!is_hex("abc"));
        assert!(!is_hex("0g"));
        assert!(!is_hex(""));
        assert!(is_hex("0a0B"));
    }
}
