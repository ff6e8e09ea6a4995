//! Content fingerprinting for change detection.
//!
//! A fingerprint is the SHA-256 digest of a note's raw text, hex-encoded.
//! No normalization is applied: a single changed byte changes the
//! fingerprint, which is what makes the delta selection trustworthy
//! independent of filesystem timestamps.

use sha2::{Digest, Sha256};

/// Compute the content fingerprint for a note body.
///
/// Deterministic and pure; the same input always yields the same 64-char
/// lowercase hex string.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(fingerprint("hello"), fingerprint("hello"));
    }

    #[test]
    fn distinct_content_distinct_fingerprint() {
        assert_ne!(fingerprint("hello"), fingerprint("world"));
    }

    #[test]
    fn single_byte_sensitivity() {
        assert_ne!(fingerprint("world"), fingerprint("world!"));
        assert_ne!(fingerprint("a b"), fingerprint("a  b"));
        assert_ne!(fingerprint("Case"), fingerprint("case"));
    }

    #[test]
    fn empty_content_is_valid() {
        let fp = fingerprint("");
        assert_eq!(fp.len(), 64);
    }

    #[test]
    fn hex_encoding_shape() {
        let fp = fingerprint("some note text");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fp.to_lowercase());
    }
}
