/// Invite code generation
///
/// Codes are derived from 16 bytes of a cryptographically secure random
/// source and encoded with the unpadded URL-safe base64 alphabet, giving
/// 22-character strings safe to embed in deep links without escaping.
///
/// # Security
///
/// - **Entropy**: 16 random bytes (128 bits); neither sequential nor
///   time-derived, so codes cannot be guessed or enumerated
/// - **Source**: `rand::thread_rng()`, a CSPRNG
/// - **Uniqueness**: not checked here. The store enforces uniqueness with
///   a constraint and the service regenerates on the (astronomically
///   rare) collision
///
/// # Example
///
/// ```
/// use stridelink_shared::invite::code::{generate, is_valid_format, CODE_LENGTH};
///
/// let code = generate();
/// assert_eq!(code.len(), CODE_LENGTH);
/// assert!(is_valid_format(&code));
/// ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Bytes of randomness backing each code
pub const CODE_ENTROPY_BYTES: usize = 16;

/// Length of an encoded code (base64url of 16 bytes, unpadded)
pub const CODE_LENGTH: usize = 22;

/// Generates a new invite code
///
/// Pure over the entropy source: no I/O, no lookup of existing codes.
pub fn generate() -> String {
    let mut bytes = [0u8; CODE_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Validates the shape of a code string
///
/// Checks length and alphabet only; whether the code exists is the
/// store's business. Useful to reject junk before a database round-trip.
///
/// # Example
///
/// ```
/// use stridelink_shared::invite::code::is_valid_format;
///
/// assert!(is_valid_format("ucXKeBTSLkyVZJWVnOYCWg"));
/// assert!(!is_valid_format("short"));
/// assert!(!is_valid_format("has spaces in it here!"));
/// ```
pub fn is_valid_format(code: &str) -> bool {
    code.len() == CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_length_and_alphabet() {
        for _ in 0..100 {
            let code = generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(is_valid_format(&code), "bad code: {}", code);
        }
    }

    #[test]
    fn test_generate_no_padding() {
        let code = generate();
        assert!(!code.contains('='));
    }

    #[test]
    fn test_generate_unique() {
        let codes: HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_is_valid_format() {
        assert!(is_valid_format("ucXKeBTSLkyVZJWVnOYCWg"));
        assert!(is_valid_format("AAAAAAAAAAAAAAAAAAAA-_"));

        // Wrong length
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("ucXKeBTSLkyVZJWVnOYCW"));
        assert!(!is_valid_format("ucXKeBTSLkyVZJWVnOYCWgX"));

        // Wrong alphabet
        assert!(!is_valid_format("ucXKeBTSLkyVZJWVnOYC+/"));
        assert!(!is_valid_format("ucXKeBTSLkyVZJWVnOYCW="));
    }
}
