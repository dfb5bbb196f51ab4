//! UTF-8 codec (spec.md §4.B).
//!
//! The wire `string` type is strictly UTF-8 with no byte-order mark.
//! Encoding is infallible (every `&str` is already well-formed UTF-8);
//! decoding fails with `Decoding` on ill-formed input.

use crate::error::{Error, Result};

/// Borrows `s` as its UTF-8 byte representation. Never allocates or fails:
/// a Rust `&str` is always well-formed UTF-8 by construction.
pub fn encode(s: &str) -> &[u8] {
    s.as_bytes()
}

/// Validates `bytes` as UTF-8 and borrows it as a `&str`.
pub fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::Decoding(format!("invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_ascii_and_multibyte() {
        for s in ["hi", "héllo wörld", "日本語", ""] {
            let bytes = encode(s);
            assert_eq!(decode(bytes).unwrap(), s);
        }
    }

    #[test]
    fn decode_rejects_ill_formed_input() {
        let bytes = [0xFF, 0xFE, 0xFD];
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn decode_rejects_truncated_multibyte_sequence() {
        // Lead byte for a 3-byte sequence with no continuation bytes.
        let bytes = [0xE2, 0x82];
        assert!(decode(&bytes).is_err());
    }
}
