//! stream/cipher/in_place.rs
//! In-place strategy: the keystream is XORed straight into the chunk.

use std::io::{self, Write};

use ctr::cipher::StreamCipher;

use crate::crypto::Aes256Ctr;
use crate::stream::cipher::types::{forward, CipherError, CipherStats, CipherStream};
use crate::stream::config::CipherStrategy;
use crate::stream::io::CloseableWrite;

pub struct InPlaceStream<W: CloseableWrite> {
    keystream: Aes256Ctr,
    sink: W,
    stats: CipherStats,
    closed: bool,
}

impl<W: CloseableWrite> InPlaceStream<W> {
    pub fn new(keystream: Aes256Ctr, sink: W) -> Self {
        Self { keystream, sink, stats: CipherStats::default(), closed: false }
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    fn seal_and_forward(&mut self, buf: &mut [u8]) -> Result<usize, CipherError> {
        if self.closed {
            return Err(CipherError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self.keystream.apply_keystream(buf);
        let n = forward(&mut self.sink, buf)?;
        self.stats.writes += 1;
        self.stats.bytes_in += buf.len() as u64;
        self.stats.bytes_out += n as u64;
        Ok(n)
    }
}

impl<W: CloseableWrite + Send> CipherStream for InPlaceStream<W> {
    fn strategy(&self) -> CipherStrategy {
        CipherStrategy::InPlace
    }

    /// Borrowed input cannot be overwritten, so it is copied into a fresh
    /// buffer for this call.
    fn write_chunk(&mut self, src: &[u8]) -> Result<usize, CipherError> {
        let mut owned = src.to_vec();
        self.seal_and_forward(&mut owned)
    }

    fn write_in_place(&mut self, buf: &mut [u8]) -> Result<usize, CipherError> {
        self.seal_and_forward(buf)
    }

    fn close(&mut self) -> Result<(), CipherError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close().map_err(CipherError::Io)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn stats(&self) -> CipherStats {
        self.stats
    }
}

impl<W: CloseableWrite + Send> Write for InPlaceStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).map_err(CipherError::into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(CipherError::Closed.into_io());
        }
        self.sink.flush()
    }
}
