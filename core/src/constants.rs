// ## 📂 File: `src/constants.rs`

//! Stable sizes and defaults shared across the writer layers.

/// AES-256 key length (bytes). The symmetric key is always this long.
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// AES block size (bytes). The IV written after the envelope is one block.
pub const IV_LEN: usize = 16;

/// SHA-256 digest length, used by OAEP for both the label hash and MGF1.
pub const OAEP_HASH_LEN: usize = 32;

/// OAEP padding overhead: `2 * hash_len + 2`.
pub const OAEP_OVERHEAD: usize = 2 * OAEP_HASH_LEN + 2;

/// Recipient modulus size (bits) below which the envelope logs a warning.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Defaults when the caller does not override `WriterConfig`.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;
pub const DEFAULT_SCRATCH_CACHE_LIMIT: usize = 64;
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
pub const MAX_COMPRESSION_LEVEL: u32 = 9;
pub const DEFAULT_DELIMITER: u8 = b',';
