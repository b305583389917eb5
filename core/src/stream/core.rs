// ## 2️⃣ `core.rs`: stable public API

//! stream/core.rs
//! `SealedWriter`: composes envelope, cipher, gzip and CSV layers and owns the
//! close order.
//!
//! Stream layout:
//! ```text
//! [RSA-OAEP envelope: modulus bytes][IV: 16 bytes][CTR(gzip(CSV(records)))]
//! ```
//!
//! Usage contract:
//! - One thread drives one writer; `&mut self` on every call enforces it.
//! - `close` must be called to produce a valid stream; dropping the writer
//!   leaves the gzip member without its trailer.

use std::io::Write;
use std::time::Instant;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::RsaPublicKey;
use serde::Serialize;
use tracing::{debug, warn};

use crate::compression::GzipLayer;
use crate::crypto::{new_keystream, Iv, KeyEnvelope};
use crate::stream::cipher::build_cipher_stream;
use crate::stream::config::{CipherStrategy, WriterConfig};
use crate::stream::encoder::RecordEncoder;
use crate::stream::io::OutputSink;
use crate::stream::state::{CompressionLayer, LayerStack, WriterState};
use crate::telemetry::{Stage, TelemetrySnapshot, TelemetryTimer, WriterCounters};
use crate::types::StreamError;

pub struct SealedWriter {
    stack: LayerStack,
    counters: WriterCounters,
    timer: TelemetryTimer,
    iv: Iv,
    envelope_len: usize,
    strategy: CipherStrategy,
    buffered: bool,
}

impl SealedWriter {
    /// Open a sealed stream for `recipient` on `sink`, drawing key and IV from `OsRng`.
    pub fn new(
        sink: OutputSink,
        recipient: &RsaPublicKey,
        config: WriterConfig,
    ) -> Result<Self, StreamError> {
        Self::with_rng(sink, recipient, config, &mut OsRng)
    }

    /// Same as `new` with a caller-supplied CSPRNG.
    ///
    /// Construction order is fixed: key + IV, wrap, envelope, IV, then the
    /// layer stack bottom-up. Any failure returns before a writer exists.
    pub fn with_rng<R: RngCore + CryptoRng>(
        mut sink: OutputSink,
        recipient: &RsaPublicKey,
        config: WriterConfig,
        rng: &mut R,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        let mut timer = TelemetryTimer::new();
        let started = Instant::now();

        let KeyEnvelope { key, iv, envelope } = KeyEnvelope::generate(rng, recipient)?;

        sink.write_all(envelope.as_bytes())?;
        sink.write_all(&iv)?;

        // The expanded key lives on inside the keystream; the raw key is zeroed on drop here.
        let keystream = new_keystream(&key[..], &iv)?;
        drop(key);

        let cipher = build_cipher_stream(&config, keystream, sink);
        let gzip = GzipLayer::new(cipher, config.compression_level)?;
        let encoder = RecordEncoder::new(gzip, &config);

        let mut counters = WriterCounters::default();
        counters.add_header(envelope.len() + iv.len());
        timer.add_stage_time(Stage::Setup, started.elapsed());

        debug!(
            envelope_len = envelope.len(),
            iv = %hex::encode(iv),
            strategy = ?config.strategy,
            buffered = config.buffered,
            "sealed writer ready"
        );

        Ok(Self {
            stack: LayerStack::Open(encoder),
            counters,
            timer,
            iv,
            envelope_len: envelope.len(),
            strategy: config.strategy,
            buffered: config.buffered,
        })
    }

    fn encoder(&mut self) -> Result<&mut RecordEncoder<CompressionLayer>, StreamError> {
        match &mut self.stack {
            LayerStack::Open(encoder) => Ok(encoder),
            _ => Err(StreamError::Closed),
        }
    }

    /// Encode one record (a sequence of fields).
    ///
    /// A malformed record (e.g. wrong field count when not `flexible`) is an
    /// `EncodingFailure`; sink errors surface as `Io` or `ShortWrite`.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<(), StreamError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let started = Instant::now();
        self.encoder()?.write_record(record)?;
        self.timer.add_stage_time(Stage::Write, started.elapsed());
        Ok(())
    }

    /// Encode one serde row.
    pub fn serialize<S: Serialize>(&mut self, record: S) -> Result<(), StreamError> {
        let started = Instant::now();
        self.encoder()?.serialize(record)?;
        self.timer.add_stage_time(Stage::Write, started.elapsed());
        Ok(())
    }

    /// Push buffered records through every layer down to the sink.
    ///
    /// This is the only path that flushes the raw sink before close.
    ///
    /// Emits a deflate sync point; the stream stays open.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.encoder()?.flush().map_err(StreamError::from_io)
    }

    /// Close the stack top-down.
    ///
    /// 1. drain the CSV encoder into gzip (nothing is flushed further down)
    /// 2. finish gzip (trailer goes through the still-open cipher)
    /// 3. close the cipher stream (buffered sink drains, then the raw sink closes)
    ///
    /// The first failing step is returned and nothing after it runs; the writer
    /// is then `Poisoned`. Calling `close` again on a closed or poisoned
    /// writer returns `StreamError::Closed`.
    pub fn close(&mut self) -> Result<TelemetrySnapshot, StreamError> {
        if matches!(self.stack, LayerStack::Closed | LayerStack::Poisoned(_)) {
            return Err(StreamError::Closed);
        }

        loop {
            let current = std::mem::replace(&mut self.stack, LayerStack::Closed);
            match current.advance(&mut self.counters, &mut self.timer) {
                Ok(LayerStack::Closed) => break,
                Ok(next) => self.stack = next,
                Err((stage, e)) => {
                    warn!(%stage, error = %e, "sealed writer poisoned");
                    self.stack = LayerStack::Poisoned(stage);
                    return Err(e);
                }
            }
        }

        self.timer.finish();
        let snapshot =
            TelemetrySnapshot::from(&self.counters, &self.timer, self.strategy, self.buffered);
        debug!(
            records = snapshot.records,
            output_bytes = snapshot.output_bytes(),
            "sealed writer closed"
        );
        Ok(snapshot)
    }

    pub fn state(&self) -> WriterState {
        self.stack.state()
    }

    /// Live counters. Bytes still buffered in the encoder or gzip are not counted yet.
    pub fn counters(&self) -> WriterCounters {
        let mut counters = self.counters.clone();
        self.stack.observe(&mut counters);
        counters
    }

    /// The public IV written after the envelope.
    pub fn iv(&self) -> &Iv {
        &self.iv
    }

    /// Envelope length; equals the recipient modulus size in bytes.
    pub fn envelope_len(&self) -> usize {
        self.envelope_len
    }

    /// Offset of the first ciphertext byte in the stream.
    pub fn header_len(&self) -> usize {
        self.envelope_len + self.iv.len()
    }

    pub fn strategy(&self) -> CipherStrategy {
        self.strategy
    }
}

impl std::fmt::Debug for SealedWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedWriter")
            .field("state", &self.state())
            .field("strategy", &self.strategy)
            .field("buffered", &self.buffered)
            .field("envelope_len", &self.envelope_len)
            .finish()
    }
}
