// ## 📂 File: `src/crypto/rng.rs`

//! Secure random fill for fixed-size secrets.
//!
//! Design notes:
//! - Callers pass any `RngCore + CryptoRng`; production uses `OsRng`.
//! - `try_fill_bytes` is used so an unavailable entropy source surfaces as
//!   `CryptoError::Rng` instead of a panic.

use rand::{CryptoRng, RngCore};

use crate::constants::{IV_LEN, SYMMETRIC_KEY_LEN};
use crate::crypto::types::{CryptoError, Iv, SymmetricKey};

/// Fill `dest` from `rng`, mapping entropy failures to `CryptoError::Rng`.
#[inline]
pub fn fill_secure<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    dest: &mut [u8],
) -> Result<(), CryptoError> {
    rng.try_fill_bytes(dest)
        .map_err(|e| CryptoError::Rng(e.to_string()))
}

/// Draw a fresh 32-byte symmetric key.
pub fn generate_key<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Result<SymmetricKey, CryptoError> {
    let mut key = SymmetricKey::new([0u8; SYMMETRIC_KEY_LEN]);
    fill_secure(rng, &mut key[..])?;
    Ok(key)
}

/// Draw a fresh IV. An all-zero IV is treated as a broken entropy source.
pub fn generate_iv<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Result<Iv, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    fill_secure(rng, &mut iv)?;
    if iv.iter().all(|&b| b == 0) {
        return Err(CryptoError::Rng("entropy source returned an all-zero IV".into()));
    }
    Ok(iv)
}
