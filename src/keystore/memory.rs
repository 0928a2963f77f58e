//! In-memory key custody over raw private keys.
//!
//! # Security
//! - Keys come from hex strings or the `TXMANAGER_PRIVATE_KEY` environment variable
//! - Keys are never logged or serialized
//! - Intended for tests and development chains; nothing is encrypted
//!
//! Imported keys start unlocked indefinitely. Passphrases are accepted but
//! ignored, so `timed_unlock` and `lock` only move the unlock grant.

use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use dashmap::DashMap;

use crate::keystore::custody::KeyCustody;
use crate::keystore::types::{KeystoreError, KeystoreResult};
use crate::keystore::unlock::UnlockTable;

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "TXMANAGER_PRIVATE_KEY";

/// Key custody backed by plaintext keys held in memory.
#[derive(Default)]
pub struct StaticKeyring {
    keys: DashMap<Address, PrivateKeySigner>,
    unlocked: UnlockTable,
}

impl StaticKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keyring holding one hex-encoded private key (with or without `0x`).
    pub fn from_private_key(private_key_hex: &str) -> KeystoreResult<Self> {
        let keyring = Self::new();
        keyring.import(private_key_hex)?;
        Ok(keyring)
    }

    /// Load a single key from `TXMANAGER_PRIVATE_KEY`.
    pub fn from_env() -> KeystoreResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            KeystoreError::InvalidKey(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Add a hex-encoded private key; it is unlocked until locked.
    pub fn import(&self, private_key_hex: &str) -> KeystoreResult<Address> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| KeystoreError::InvalidKey(format!("Invalid private key format: {}", e)))?;

        Ok(self.insert(signer))
    }

    /// Addresses held by this keyring, sorted.
    pub fn accounts(&self) -> Vec<Address> {
        let mut accounts: Vec<Address> = self.keys.iter().map(|entry| *entry.key()).collect();
        accounts.sort();
        accounts
    }

    /// Whether `address` currently holds a valid unlock grant.
    pub fn is_unlocked(&self, address: &Address) -> bool {
        self.unlocked.is_unlocked(address)
    }

    fn insert(&self, signer: PrivateKeySigner) -> Address {
        let address = signer.address();
        self.keys.insert(address, signer.clone());
        self.unlocked.grant(signer, Duration::ZERO);
        tracing::info!(account = %address, "Key imported");
        address
    }
}

impl KeyCustody for StaticKeyring {
    fn timed_unlock(&self, address: Address, _passphrase: &str, duration: Duration) -> KeystoreResult<()> {
        let signer = self
            .keys
            .get(&address)
            .map(|entry| entry.value().clone())
            .ok_or(KeystoreError::KeyNotFound(address))?;

        // A fresh grant replaces whatever is there, so a timed unlock of an
        // imported key actually starts its countdown.
        self.unlocked.revoke(&address);
        self.unlocked.grant(signer, duration);
        Ok(())
    }

    fn lock(&self, address: Address) -> KeystoreResult<()> {
        self.unlocked.revoke(&address);
        Ok(())
    }

    fn sign_digest(&self, digest: &[u8], address: Address) -> KeystoreResult<Vec<u8>> {
        if digest.len() != 32 {
            return Err(KeystoreError::InvalidDigestLength(digest.len()));
        }
        if !self.keys.contains_key(&address) {
            return Err(KeystoreError::KeyNotFound(address));
        }
        self.unlocked.sign(address, &B256::from_slice(digest))
    }

    fn create_account(&self, _passphrase: &str) -> KeystoreResult<Address> {
        Ok(self.insert(PrivateKeySigner::random()))
    }
}

impl std::fmt::Debug for StaticKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeyring")
            .field("accounts", &self.accounts())
            .finish()
    }
}
