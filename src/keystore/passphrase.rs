//! Passphrase derivation for key files.
//!
//! Key files are never encrypted under the user's literal passphrase. The
//! effective secret is the hex form of the first [`DERIVED_LEN`] bytes of
//! `keccak256(rlp([DERIVATION_DOMAIN, passphrase]))`.

use alloy::hex;
use alloy::primitives::keccak256;

/// Domain-separation prefix hashed together with every passphrase.
///
/// Existing key files are encrypted under secrets derived from this exact
/// string; changing a single byte makes them unreadable.
pub const DERIVATION_DOMAIN: &str = "func (ks *DefaultKeystore) getDecryptedKey(a accounts.Account, auth string) (accounts.Account, *keystore.Key, error)";

/// Number of digest bytes kept (20 hex characters).
pub const DERIVED_LEN: usize = 10;

/// Derive the secret actually used to encrypt and decrypt key files.
pub fn derive_passphrase(passphrase: &str) -> String {
    let mut encoded = Vec::with_capacity(DERIVATION_DOMAIN.len() + passphrase.len() + 8);
    alloy::rlp::encode_list::<&str, str>(&[DERIVATION_DOMAIN, passphrase], &mut encoded);
    let digest = keccak256(&encoded);
    hex::encode(&digest[..DERIVED_LEN])
}
