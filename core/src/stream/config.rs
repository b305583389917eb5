//! stream/config.rs
//! Writer configuration: cipher strategy, buffering, and encoder knobs.
//!
//! The core reads no files or environment. `WriterConfig` derives serde so a
//! caller can embed it in whatever configuration it already loads.

use serde::{Deserialize, Serialize};

use crate::compression::validate_level;
use crate::constants::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_COMPRESSION_LEVEL, DEFAULT_DELIMITER,
    DEFAULT_SCRATCH_CACHE_LIMIT,
};
use crate::types::StreamError;

/// How the cipher layer turns plaintext chunks into ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherStrategy {
    /// XOR into the chunk itself. `write_in_place` overwrites the caller's
    /// buffer with no extra allocation. Writes arriving through `io::Write`
    /// (every write `SealedWriter` makes, via gzip) borrow their input, so
    /// they are copied into a fresh buffer per write.
    InPlace,
    /// XOR into a reusable scratch buffer chosen by chunk length.
    #[default]
    Cached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Cipher strategy. Both produce identical ciphertext.
    pub strategy: CipherStrategy,

    /// Interpose a `BufferedSink` between the cipher and the raw sink.
    pub buffered: bool,

    /// Accumulation capacity of the `BufferedSink` (bytes).
    pub buffer_capacity: usize,

    /// Max distinct chunk lengths kept by the cached strategy before LRU eviction.
    pub scratch_cache_limit: usize,

    /// gzip level, 0..=9.
    pub compression_level: u32,

    /// CSV field delimiter.
    pub delimiter: u8,

    /// Terminate records with `\r\n` instead of `\n`.
    pub use_crlf: bool,

    /// Allow records with differing field counts.
    pub flexible: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            strategy: CipherStrategy::Cached,
            buffered: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            scratch_cache_limit: DEFAULT_SCRATCH_CACHE_LIMIT,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            delimiter: DEFAULT_DELIMITER,
            use_crlf: false,
            flexible: false,
        }
    }
}

impl WriterConfig {
    pub fn new(strategy: CipherStrategy) -> Self {
        Self { strategy, ..Self::default() }
    }

    pub fn with_strategy(mut self, strategy: CipherStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable the buffered sink with the given capacity.
    pub fn with_buffer(mut self, capacity: usize) -> Self {
        self.buffered = true;
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_scratch_cache_limit(mut self, limit: usize) -> Self {
        self.scratch_cache_limit = limit;
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_crlf(mut self, use_crlf: bool) -> Self {
        self.use_crlf = use_crlf;
        self
    }

    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.buffered && self.buffer_capacity == 0 {
            return Err(StreamError::Config("buffer_capacity must be > 0 when buffered".into()));
        }
        if self.scratch_cache_limit == 0 {
            return Err(StreamError::Config("scratch_cache_limit must be >= 1".into()));
        }
        validate_level(self.compression_level)
            .map_err(|e| StreamError::Config(e.to_string()))?;
        if matches!(self.delimiter, b'"' | b'\r' | b'\n') {
            return Err(StreamError::Config(format!(
                "invalid delimiter: 0x{:02x}",
                self.delimiter
            )));
        }
        Ok(())
    }
}
