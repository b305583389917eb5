// ## 📂 File: `src/stream/buffered.rs`

//! Accumulating adapter between the cipher output and the raw sink.
//!
//! Design notes:
//! - `write` only appends; it never calls `flush` on the sink below. When the
//!   next chunk would overflow `capacity`, the accumulated bytes are handed down
//!   first, and a chunk at least as large as `capacity` goes straight through.
//! - `close` drains the buffer before closing the sink. If draining fails the
//!   sink is left open and the error is returned, so buffered bytes are never
//!   dropped silently behind a successful close.

use std::io::{self, Write};

use bytes::BytesMut;

use crate::stream::io::CloseableWrite;

pub struct BufferedSink<W: CloseableWrite> {
    inner: W,
    buf: BytesMut,
    capacity: usize,
    closed: bool,
}

impl<W: CloseableWrite> BufferedSink<W> {
    /// `capacity` is clamped to at least one byte.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { inner, buf: BytesMut::with_capacity(capacity), capacity, closed: false }
    }

    /// Bytes accepted but not yet handed to the inner sink.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Hand every buffered byte to the inner sink without flushing it.
    fn drain(&mut self) -> io::Result<()> {
        while !self.buf.is_empty() {
            match self.inner.write(&self.buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "buffered sink: inner sink accepted no bytes",
                    ))
                }
                Ok(n) => {
                    let _ = self.buf.split_to(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<W: CloseableWrite> Write for BufferedSink<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "buffered sink closed"));
        }
        if self.buf.len() + data.len() > self.capacity {
            self.drain()?;
        }
        if data.len() >= self.capacity {
            return self.inner.write(data);
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.inner.flush()
    }
}

impl<W: CloseableWrite> CloseableWrite for BufferedSink<W> {
    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        if let Err(e) = self.drain() {
            tracing::warn!(pending = self.buf.len(), error = %e, "buffered sink flush failed; inner sink left open");
            return Err(e);
        }
        self.closed = true;
        self.inner.close()
    }
}
