// ## 📂 File: `src/crypto/keystream.rs`

//! AES-256 in counter mode.
//!
//! The full 16-byte IV is the initial counter block and is incremented as a
//! 128-bit big-endian integer, so any reader with the same key/IV reproduces
//! the keystream. Never reuse a (key, IV) pair.

use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::constants::{IV_LEN, SYMMETRIC_KEY_LEN};
use crate::crypto::types::CryptoError;

pub type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Build the keystream from raw key and IV bytes.
pub fn new_keystream(key: &[u8], iv: &[u8]) -> Result<Aes256Ctr, CryptoError> {
    if key.len() != SYMMETRIC_KEY_LEN {
        return Err(CryptoError::InvalidKeyLen { expected: SYMMETRIC_KEY_LEN, actual: key.len() });
    }
    if iv.len() != IV_LEN {
        return Err(CryptoError::InvalidKeyLen { expected: IV_LEN, actual: iv.len() });
    }
    Aes256Ctr::new_from_slices(key, iv)
        .map_err(|e| CryptoError::Failure(format!("keystream init failed: {}", e)))
}

/// XOR the keystream into `buf`. Applying it twice with the same key/IV is identity.
#[inline]
pub fn apply_keystream(ks: &mut Aes256Ctr, buf: &mut [u8]) {
    ks.apply_keystream(buf);
}
