//! Encrypted identity blob.
//!
//! Seals the operator's account id with AES-256-GCM so it can sit in the
//! session store (and in the profile document's `internal_id` slot)
//! without exposing the raw id. The key is derived from configured key
//! material by hashing it to 32 bytes with SHA-256.

use aes_gcm::{
    Aes256Gcm, Key, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Nonce length for AES-GCM (12 bytes standard).
const NONCE_LENGTH: usize = 12;

/// Errors from sealing or opening an identity blob.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Encryption failed.
    #[error("failed to seal identity")]
    Seal,
    /// Decryption failed (tampered ciphertext or wrong key/nonce).
    #[error("failed to open identity")]
    Open,
    /// Ciphertext or nonce is not valid hex / has the wrong length.
    #[error("malformed identity blob")]
    Malformed,
}

/// A sealed identity: hex ciphertext plus the hex nonce it was sealed
/// with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedIdentity {
    /// Hex-encoded ciphertext.
    pub ciphertext: String,
    /// Hex-encoded nonce.
    pub nonce: String,
}

impl SealedIdentity {
    /// Single-string form (`nonce:ciphertext`) for storage in a document
    /// field.
    #[must_use]
    pub fn compact(&self) -> String {
        format!("{}:{}", self.nonce, self.ciphertext)
    }
}

/// Seals and opens identity blobs under a fixed configured key.
#[derive(Clone)]
pub struct IdentityVault {
    cipher: Aes256Gcm,
}

impl IdentityVault {
    /// Build a vault from configured key material.
    ///
    /// The material is hashed to exactly 32 bytes, so any non-trivial
    /// string works as input.
    #[must_use]
    pub fn new(key_material: &SecretString) -> Self {
        let digest = Sha256::digest(key_material.expose_secret().as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Seal a plaintext identity with a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Seal` if encryption fails.
    pub fn seal(&self, plaintext: &str) -> Result<SealedIdentity, IdentityError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| IdentityError::Seal)?;

        Ok(SealedIdentity {
            ciphertext: hex::encode(ciphertext),
            nonce: hex::encode(nonce),
        })
    }

    /// Open a sealed identity back into its plaintext.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Malformed` for bad hex or nonce length, and
    /// `IdentityError::Open` when authentication of the ciphertext fails.
    pub fn open(&self, ciphertext_hex: &str, nonce_hex: &str) -> Result<String, IdentityError> {
        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| IdentityError::Malformed)?;
        let nonce_bytes = hex::decode(nonce_hex).map_err(|_| IdentityError::Malformed)?;
        if nonce_bytes.len() != NONCE_LENGTH {
            return Err(IdentityError::Malformed);
        }

        let nonce = Nonce::from_slice(&nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext.as_slice())
            .map_err(|_| IdentityError::Open)?;

        String::from_utf8(plaintext).map_err(|_| IdentityError::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> IdentityVault {
        IdentityVault::new(&SecretString::from("kR9#mW2xLq8!fT4zVb6&nH3$jC5@pD7y"))
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let vault = vault();
        let sealed = vault.seal("acct_42").expect("seal");
        let opened = vault.open(&sealed.ciphertext, &sealed.nonce).expect("open");
        assert_eq!(opened, "acct_42");
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let vault = vault();
        let a = vault.seal("acct_42").expect("seal");
        let b = vault.seal("acct_42").expect("seal");
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let vault = vault();
        let sealed = vault.seal("acct_42").expect("seal");

        let mut tampered = sealed.ciphertext.clone();
        // Flip the first hex digit
        let flipped = if tampered.starts_with('0') { "1" } else { "0" };
        tampered.replace_range(0..1, flipped);

        assert!(matches!(
            vault.open(&tampered, &sealed.nonce),
            Err(IdentityError::Open)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sealed = vault().seal("acct_42").expect("seal");
        let other = IdentityVault::new(&SecretString::from("zQ1!wE5rT9@yU3iO7pA2sD6fG0hJ4kL8"));
        assert!(other.open(&sealed.ciphertext, &sealed.nonce).is_err());
    }

    #[test]
    fn test_malformed_inputs() {
        let vault = vault();
        assert!(matches!(
            vault.open("not-hex", "00"),
            Err(IdentityError::Malformed)
        ));
        let sealed = vault.seal("acct_42").expect("seal");
        // Nonce of the wrong length
        assert!(matches!(
            vault.open(&sealed.ciphertext, "0011"),
            Err(IdentityError::Malformed)
        ));
    }

    #[test]
    fn test_compact_form() {
        let sealed = SealedIdentity {
            ciphertext: "beef".to_string(),
            nonce: "0011".to_string(),
        };
        assert_eq!(sealed.compact(), "0011:beef");
    }
}
