//! stream/encoder.rs
//! CSV record encoder at the top of the stack.
//!
//! The csv writer buffers internally; nothing reaches the gzip layer until its
//! buffer fills, `flush` is called, or `finish` runs as step one of close.
//!
//! `finish` hands the csv buffer to the layer below and stops there: no flush
//! is sent further down, so gzip emits no sync block and a buffered sink keeps
//! its bytes until the cipher close step. Only `flush` reaches the raw sink.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use crate::stream::config::WriterConfig;

pub struct RecordEncoder<W: Write> {
    inner: csv::Writer<FlushGate<W>>,
    records: u64,
}

/// Writer under the csv encoder. Writes pass through; `flush` is forwarded
/// only while the gate is open.
struct FlushGate<W> {
    inner: W,
    open: AtomicBool,
}

impl<W: Write> Write for FlushGate<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.open.load(Ordering::Relaxed) {
            self.inner.flush()
        } else {
            Ok(())
        }
    }
}

impl<W: Write> RecordEncoder<W> {
    pub fn new(inner: W, config: &WriterConfig) -> Self {
        let terminator = if config.use_crlf { Terminator::CRLF } else { Terminator::Any(b'\n') };
        let inner = WriterBuilder::new()
            .delimiter(config.delimiter)
            .terminator(terminator)
            .flexible(config.flexible)
            .has_headers(false)
            .from_writer(FlushGate { inner, open: AtomicBool::new(false) });
        Self { inner, records: 0 }
    }

    /// Encode one record. Fields are written verbatim with CSV quoting.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(record)?;
        self.records += 1;
        Ok(())
    }

    /// Encode one record from any serde-serializable row type.
    pub fn serialize<S: Serialize>(&mut self, record: S) -> Result<(), csv::Error> {
        self.inner.serialize(record)?;
        self.records += 1;
        Ok(())
    }

    /// Push buffered CSV bytes into the layer below and flush every layer
    /// down to the raw sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.get_ref().open.store(true, Ordering::Relaxed);
        let result = self.inner.flush();
        self.inner.get_ref().open.store(false, Ordering::Relaxed);
        result
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn get_ref(&self) -> &W {
        &self.inner.get_ref().inner
    }

    /// Write out the csv buffer and return the writer below, unflushed.
    pub fn finish(self) -> io::Result<W> {
        self.inner
            .into_inner()
            .map(|gate| gate.inner)
            .map_err(|e| e.into_error())
    }
}
