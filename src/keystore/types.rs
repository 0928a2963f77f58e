//! Key custody error definitions.

use alloy::primitives::Address;
use thiserror::Error;

/// Errors that can occur while unlocking keys or signing digests.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// No key file matches the requested address.
    #[error("no key for account {0}")]
    KeyNotFound(Address),

    /// The account has no valid unlock grant (never unlocked, locked, or expired).
    #[error("account {0} is locked")]
    Locked(Address),

    /// The derived passphrase could not open the stored key.
    #[error("could not decrypt key: {0}")]
    DecryptionFailed(String),

    /// The decrypted key belongs to a different account than requested.
    #[error("key content mismatch: have account {have}, want {want}")]
    AddressMismatch { have: Address, want: Address },

    /// Digests must be exactly 32 bytes.
    #[error("invalid digest length: got {0} bytes, want 32")]
    InvalidDigestLength(usize),

    /// Raw private key material could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// The signing primitive failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Key storage could not be read or written.
    #[error("key storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Result type for key custody operations.
pub type KeystoreResult<T> = Result<T, KeystoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeystoreError::InvalidDigestLength(31);
        assert_eq!(err.to_string(), "invalid digest length: got 31 bytes, want 32");

        let err = KeystoreError::AddressMismatch {
            have: Address::repeat_byte(0x11),
            want: Address::repeat_byte(0x22),
        };
        let text = err.to_string();
        assert!(text.contains("have account 0x1111"));
        assert!(text.contains("want 0x2222"));
    }
}
