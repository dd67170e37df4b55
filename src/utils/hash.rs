//! Content digests for change detection.
//!
//! A resource's bytes are hashed so that rebuilds which do not alter the
//! output can be told apart from real content changes, regardless of what
//! the filesystem mtime claims.

/// Compute the content digest of a byte payload as lowercase hex.
///
/// Callers supply bytes already read from disk or network; this function
/// performs no I/O itself.
pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_length() {
        // 256-bit digest -> 64 hex chars
        assert_eq!(digest(b"hello").len(), 64);
        assert_eq!(digest(b"").len(), 64);
    }

    #[test]
    fn test_digest_stable() {
        assert_eq!(digest(b"same payload"), digest(b"same payload"));
    }

    #[test]
    fn test_digest_differs_on_content() {
        assert_ne!(digest(b"payload a"), digest(b"payload b"));
    }

    #[test]
    fn test_digest_lowercase() {
        let hex = digest(b"anything");
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
