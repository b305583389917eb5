// ## 📂 File: `src/crypto/types.rs`

use std::fmt;

use zeroize::Zeroizing;

use crate::constants::{IV_LEN, SYMMETRIC_KEY_LEN};

/// Ephemeral AES-256 key. Zeroed when dropped.
pub type SymmetricKey = Zeroizing<[u8; SYMMETRIC_KEY_LEN]>;

/// Public counter-mode IV (one AES block).
pub type Iv = [u8; IV_LEN];

/// The symmetric key wrapped for one recipient with RSA-OAEP.
///
/// Length always equals the recipient modulus size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKeyEnvelope(Vec<u8>);

impl EncryptedKeyEnvelope {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for EncryptedKeyEnvelope {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug)]
pub enum CryptoError {
    /// Entropy source could not supply bytes.
    Rng(String),

    /// Plaintext key exceeds the OAEP payload allowed by the modulus.
    KeyTooLarge { max: usize, actual: usize },

    /// Invalid key or IV length handed to the keystream.
    InvalidKeyLen { expected: usize, actual: usize },

    /// General wrap or runtime error with context.
    Failure(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            Rng(msg) =>
                write!(f, "rng failure: {}", msg),
            KeyTooLarge { max, actual } =>
                write!(f, "key too large: max={}, actual={}", max, actual),
            InvalidKeyLen { expected, actual } =>
                write!(f, "invalid key length: expected={}, actual={}", expected, actual),
            Failure(msg) =>
                write!(f, "crypto failure: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}
