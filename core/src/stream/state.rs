//! stream/state.rs
//! The layer stack and its close protocol as an explicit state machine.
//!
//! ```text
//! Open ──drain encoder──▶ Flushed ──finish gzip──▶ CompressionClosed
//!      ──close cipher──▶ CipherClosed ──▶ Closed
//! ```
//!
//! Each transition consumes the layer it finishes and yields the layer below,
//! so the compiler rules out closing the cipher before gzip has written its
//! trailer through it. A failed step parks the stack in `Poisoned`; no further
//! step is attempted.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compression::GzipLayer;
use crate::stream::cipher::{CipherError, CipherStream};
use crate::stream::encoder::RecordEncoder;
use crate::telemetry::{Stage, TelemetryTimer, WriterCounters};
use crate::types::{unwrap_cipher_error, StreamError};

pub(crate) type CipherLayer = Box<dyn CipherStream>;
pub(crate) type CompressionLayer = GzipLayer<CipherLayer>;
pub(crate) type EncoderLayer = RecordEncoder<CompressionLayer>;

/// Step of the close sequence, carried by close-time errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseStage {
    EncoderFlush,
    CompressionClose,
    CipherClose,
}

impl fmt::Display for CloseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloseStage::EncoderFlush     => "encoder flush",
            CloseStage::CompressionClose => "compression close",
            CloseStage::CipherClose      => "cipher close",
        };
        f.write_str(name)
    }
}

/// Observable writer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriterState {
    Open,
    Flushed,
    CompressionClosed,
    CipherClosed,
    Closed,
    /// A close step failed at the given stage. Terminal.
    Poisoned(CloseStage),
}

pub(crate) enum LayerStack {
    Open(EncoderLayer),
    Flushed(CompressionLayer),
    CompressionClosed(CipherLayer),
    CipherClosed,
    Closed,
    Poisoned(CloseStage),
}

impl LayerStack {
    pub(crate) fn state(&self) -> WriterState {
        match self {
            LayerStack::Open(_)              => WriterState::Open,
            LayerStack::Flushed(_)           => WriterState::Flushed,
            LayerStack::CompressionClosed(_) => WriterState::CompressionClosed,
            LayerStack::CipherClosed         => WriterState::CipherClosed,
            LayerStack::Closed               => WriterState::Closed,
            LayerStack::Poisoned(stage)      => WriterState::Poisoned(*stage),
        }
    }

    /// Refresh `counters` from whatever layers are still alive.
    pub(crate) fn observe(&self, counters: &mut WriterCounters) {
        match self {
            LayerStack::Open(encoder) => {
                counters.records = encoder.records();
                counters.bytes_encoded = encoder.get_ref().bytes_in();
                counters.absorb_cipher(&encoder.get_ref().get_ref().stats());
            }
            LayerStack::Flushed(gzip) => {
                counters.bytes_encoded = gzip.bytes_in();
                counters.absorb_cipher(&gzip.get_ref().stats());
            }
            LayerStack::CompressionClosed(cipher) => {
                counters.absorb_cipher(&cipher.stats());
            }
            _ => {}
        }
    }

    /// Perform exactly one close step and return the next state.
    ///
    /// On error the caller must not call `advance` again; the stack it held is
    /// gone and the writer is poisoned.
    pub(crate) fn advance(
        self,
        counters: &mut WriterCounters,
        timer: &mut TelemetryTimer,
    ) -> Result<LayerStack, (CloseStage, StreamError)> {
        self.observe(counters);
        match self {
            LayerStack::Open(encoder) => {
                let started = Instant::now();
                let gzip = encoder
                    .finish()
                    .map_err(|e| fail(CloseStage::EncoderFlush, e, true))?;
                timer.add_stage_time(Stage::Flush, started.elapsed());
                debug!(records = counters.records, "encoder flushed");
                Ok(LayerStack::Flushed(gzip))
            }
            LayerStack::Flushed(gzip) => {
                let started = Instant::now();
                let (cipher, bytes_in) = gzip
                    .finish()
                    .map_err(|e| fail(CloseStage::CompressionClose, e, false))?;
                counters.bytes_encoded = bytes_in;
                timer.add_stage_time(Stage::CompressionClose, started.elapsed());
                debug!(bytes_encoded = bytes_in, "gzip trailer written");
                Ok(LayerStack::CompressionClosed(cipher))
            }
            LayerStack::CompressionClosed(mut cipher) => {
                let started = Instant::now();
                let result = cipher.close();
                counters.absorb_cipher(&cipher.stats());
                result.map_err(|e| fail(CloseStage::CipherClose, e.into_io(), false))?;
                timer.add_stage_time(Stage::CipherClose, started.elapsed());
                debug!(bytes_ciphertext = counters.bytes_ciphertext, "cipher stream closed");
                Ok(LayerStack::CipherClosed)
            }
            LayerStack::CipherClosed => Ok(LayerStack::Closed),
            LayerStack::Closed | LayerStack::Poisoned(_) => {
                Err((CloseStage::CipherClose, StreamError::Closed))
            }
        }
    }
}

/// Classify a close-time `io::Error`.
///
/// Cipher-level failures (short write, keystream) keep their own variant;
/// sink errors become `FlushFailure` / `CloseFailure` tagged with the stage.
fn fail(stage: CloseStage, e: std::io::Error, is_flush: bool) -> (CloseStage, StreamError) {
    warn!(%stage, error = %e, "close step failed");
    let err = match unwrap_cipher_error(e) {
        Ok(CipherError::Io(source)) | Err(source) => {
            if is_flush {
                StreamError::FlushFailure { stage, source }
            } else {
                StreamError::CloseFailure { stage, source }
            }
        }
        Ok(cipher) => StreamError::from(cipher),
    };
    (stage, err)
}
