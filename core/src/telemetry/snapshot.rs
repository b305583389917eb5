// ## src/telemetry/snapshot.rs

//! Immutable telemetry for one finished stream.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::stream::config::CipherStrategy;
use crate::telemetry::counters::WriterCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub strategy: CipherStrategy,
    pub buffered: bool,
    pub records: u64,
    pub bytes_encoded: u64,
    pub bytes_compressed: u64,
    pub bytes_ciphertext: u64,
    pub bytes_header: u64,
    pub cipher_writes: u64,
    pub scratch_hits: u64,
    pub scratch_misses: u64,
    pub scratch_evictions: u64,
    /// gzip bytes / CSV bytes. Zero for an empty stream.
    pub compression_ratio: f64,
    pub throughput_encoded_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(
        counters: &WriterCounters,
        timer: &TelemetryTimer,
        strategy: CipherStrategy,
        buffered: bool,
    ) -> Self {
        let elapsed = timer.elapsed();

        let compression_ratio = if counters.bytes_encoded > 0 {
            counters.bytes_compressed as f64 / counters.bytes_encoded as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_encoded as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            strategy,
            buffered,
            records: counters.records,
            bytes_encoded: counters.bytes_encoded,
            bytes_compressed: counters.bytes_compressed,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_header: counters.bytes_header,
            cipher_writes: counters.cipher_writes,
            scratch_hits: counters.scratch_hits,
            scratch_misses: counters.scratch_misses,
            scratch_evictions: counters.scratch_evictions,
            compression_ratio,
            throughput_encoded_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Bytes the raw sink received: envelope + IV + ciphertext.
    pub fn output_bytes(&self) -> u64 {
        self.bytes_header + self.bytes_ciphertext
    }

    /// Internal consistency:
    /// - CTR is length preserving, so ciphertext == compressed bytes.
    /// - Stage times never exceed wall-clock elapsed.
    pub fn sanity_check(&self) -> bool {
        self.bytes_ciphertext == self.bytes_compressed
            && self.stage_times.total() <= self.elapsed
    }
}
