//! Gzip via flate2 with streaming encode.

use std::io::{self, Write};

use flate2::{write::GzEncoder, Compression};

use crate::compression::types::{validate_level, CompressionError};

/// Streaming gzip encoder over any writer, counting bytes accepted from above.
pub struct GzipLayer<W: Write> {
    inner: GzEncoder<W>,
    bytes_in: u64,
}

impl<W: Write> GzipLayer<W> {
    pub fn new(inner: W, level: u32) -> Result<Self, CompressionError> {
        validate_level(level)?;
        Ok(Self {
            inner: GzEncoder::new(inner, Compression::new(level)),
            bytes_in: 0,
        })
    }

    /// Uncompressed bytes written into this layer so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Finalize the gzip member and hand back the writer below.
    ///
    /// Writes the remaining deflate blocks and the gzip trailer into `W`;
    /// `W` must still be open when this runs.
    pub fn finish(self) -> io::Result<(W, u64)> {
        let bytes_in = self.bytes_in;
        let inner = self.inner.finish()?;
        Ok((inner, bytes_in))
    }
}

impl<W: Write> Write for GzipLayer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_in += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
