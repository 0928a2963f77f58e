//! The key custody capability.
//!
//! The signing pipeline depends on this trait, never on a concrete key
//! store, and never sees private key material.

use std::time::Duration;

use alloy::primitives::Address;

use crate::keystore::types::KeystoreResult;

/// Something that holds private keys and signs digests on their behalf.
pub trait KeyCustody: Send + Sync {
    /// Unlock `address` for `duration`. `Duration::ZERO` unlocks until
    /// [`lock`](Self::lock) is called or the custodian is dropped.
    ///
    /// Fails with `KeyNotFound`, `DecryptionFailed` or `AddressMismatch`.
    fn timed_unlock(&self, address: Address, passphrase: &str, duration: Duration) -> KeystoreResult<()>;

    /// Unlock `address` indefinitely.
    fn unlock(&self, address: Address, passphrase: &str) -> KeystoreResult<()> {
        self.timed_unlock(address, passphrase, Duration::ZERO)
    }

    /// Revoke any unlock grant held for `address`.
    fn lock(&self, address: Address) -> KeystoreResult<()>;

    /// Sign a 32-byte digest, returning `[R(32) || S(32) || recovery id(1)]`.
    ///
    /// Fails with `Locked` when `address` has no valid unlock and
    /// `InvalidDigestLength` when `digest` is not 32 bytes.
    fn sign_digest(&self, digest: &[u8], address: Address) -> KeystoreResult<Vec<u8>>;

    /// Generate, encrypt and persist a new key; returns its address.
    fn create_account(&self, passphrase: &str) -> KeystoreResult<Address>;
}
