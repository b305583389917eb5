// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Byte and record counters for one sealed writer.
//!
//! Summary: refreshed from the layer stack on demand and frozen into a
//! `TelemetrySnapshot` when the stack closes.
use bincode::{Decode, Encode};

use crate::stream::cipher::CipherStats;

#[derive(Default, Clone, Debug, Encode, Decode, PartialEq, Eq)]
pub struct WriterCounters {
    pub records: u64,
    /// CSV bytes handed to the gzip layer.
    pub bytes_encoded: u64,
    /// gzip bytes handed to the cipher.
    pub bytes_compressed: u64,
    /// Ciphertext bytes forwarded below the cipher.
    pub bytes_ciphertext: u64,
    /// Envelope + IV bytes written in the clear.
    pub bytes_header: u64,
    pub cipher_writes: u64,
    pub scratch_hits: u64,
    pub scratch_misses: u64,
    pub scratch_evictions: u64,
}

impl WriterCounters {
    /// Record the cleartext stream prefix.
    pub fn add_header(&mut self, header_len: usize) {
        self.bytes_header += header_len as u64;
    }

    /// Overwrite the cipher-side counters with a fresh reading.
    pub fn absorb_cipher(&mut self, stats: &CipherStats) {
        self.cipher_writes = stats.writes;
        self.bytes_compressed = stats.bytes_in;
        self.bytes_ciphertext = stats.bytes_out;
        self.scratch_hits = stats.scratch_hits;
        self.scratch_misses = stats.scratch_misses;
        self.scratch_evictions = stats.scratch_evictions;
    }

    /// Total bytes the raw sink has received (or will, once buffers drain).
    pub fn bytes_total(&self) -> u64 {
        self.bytes_header + self.bytes_ciphertext
    }

    /// Compact binary form for callers that persist counters.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::encode_to_vec(self, bincode::config::standard())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let (counters, _) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(counters)
    }
}
