//! Key custody subsystem.
//!
//! # Data Flow
//! ```text
//! passphrase
//!     → passphrase.rs (domain-separated derivation)
//!     → local.rs (find key file, decrypt, swap-attack check)
//!     → unlock.rs (address → signer + expiry, checked lazily)
//!     → sign_digest (65-byte R || S || recovery id)
//! ```
//!
//! # Security Constraints
//! - Callers only ever see signatures, never key material
//! - A decrypted key is always checked against the requested address
//! - Never log passphrases or private keys

pub mod custody;
pub mod local;
pub mod memory;
pub mod passphrase;
pub mod types;
pub mod unlock;

pub use custody::KeyCustody;
pub use local::FileKeystore;
pub use memory::StaticKeyring;
pub use passphrase::derive_passphrase;
pub use types::{KeystoreError, KeystoreResult};
