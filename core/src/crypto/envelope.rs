// ## 📂 File: `src/crypto/envelope.rs`

//! crypto/envelope.rs
//! Hybrid key envelope: an ephemeral AES key wrapped for one RSA recipient.
//!
//! Design notes:
//! - RSA-OAEP with SHA-256 as both the padding hash and the MGF1 hash.
//! - Envelope length always equals the recipient modulus size in bytes.
//! - Envelope bytes and then the IV are the first bytes of every stream,
//!   written in the clear. A reader must know the modulus size out of band.

use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;
use tracing::warn;

use crate::constants::{MIN_MODULUS_BITS, OAEP_OVERHEAD};
use crate::crypto::rng::{generate_iv, generate_key};
use crate::crypto::types::{CryptoError, EncryptedKeyEnvelope, Iv, SymmetricKey};

/// Largest payload OAEP(SHA-256) can wrap under a modulus of `modulus_len` bytes.
#[inline]
pub fn max_wrap_payload(modulus_len: usize) -> usize {
    modulus_len.saturating_sub(OAEP_OVERHEAD)
}

/// Wrap `key` for `recipient`.
///
/// # Errors
/// - `CryptoError::KeyTooLarge` when `key` exceeds `max_wrap_payload`.
/// - `CryptoError::Failure` for any other RSA error.
pub fn wrap_key<R: RngCore + CryptoRng>(
    rng: &mut R,
    recipient: &RsaPublicKey,
    key: &[u8],
) -> Result<EncryptedKeyEnvelope, CryptoError> {
    let modulus_len = recipient.size();
    let max = max_wrap_payload(modulus_len);
    if key.len() > max {
        return Err(CryptoError::KeyTooLarge { max, actual: key.len() });
    }
    if modulus_len * 8 < MIN_MODULUS_BITS {
        warn!(modulus_bits = modulus_len * 8, "recipient modulus below recommended minimum");
    }

    let wrapped = recipient
        .encrypt(rng, Oaep::new::<Sha256>(), key)
        .map_err(|e| match e {
            rsa::Error::MessageTooLong => CryptoError::KeyTooLarge { max, actual: key.len() },
            other => CryptoError::Failure(format!("RSA-OAEP wrap failed: {}", other)),
        })?;

    debug_assert_eq!(wrapped.len(), modulus_len);
    Ok(EncryptedKeyEnvelope::new(wrapped))
}

/// Everything the writer needs from the key exchange: the secret key, the
/// public IV, and the envelope to put in front of the stream.
pub struct KeyEnvelope {
    pub key: SymmetricKey,
    pub iv: Iv,
    pub envelope: EncryptedKeyEnvelope,
}

impl KeyEnvelope {
    /// Generate a fresh key and IV and wrap the key for `recipient`.
    pub fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        recipient: &RsaPublicKey,
    ) -> Result<Self, CryptoError> {
        let key = generate_key(rng)?;
        let envelope = wrap_key(rng, recipient, &key[..])?;
        let iv = generate_iv(rng)?;
        Ok(Self { key, iv, envelope })
    }

    /// Stream prefix length: envelope followed by the IV.
    pub fn header_len(&self) -> usize {
        self.envelope.len() + self.iv.len()
    }
}

impl std::fmt::Debug for KeyEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyEnvelope")
            .field("key", &"<redacted>")
            .field("iv", &hex::encode(self.iv))
            .field("envelope_len", &self.envelope.len())
            .finish()
    }
}
