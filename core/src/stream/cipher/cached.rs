//! stream/cipher/cached.rs
//! Cached-buffer strategy: ciphertext is produced into a scratch buffer picked
//! by chunk length, so steady-state equal-length writes allocate nothing.

use std::io::{self, Write};

use ctr::cipher::StreamCipher;

use crate::crypto::Aes256Ctr;
use crate::stream::cipher::scratch::ScratchCache;
use crate::stream::cipher::types::{forward, CipherError, CipherStats, CipherStream};
use crate::stream::config::CipherStrategy;
use crate::stream::io::CloseableWrite;

pub struct CachedStream<W: CloseableWrite> {
    keystream: Aes256Ctr,
    sink: W,
    scratch: ScratchCache,
    stats: CipherStats,
    closed: bool,
}

impl<W: CloseableWrite> CachedStream<W> {
    pub fn new(keystream: Aes256Ctr, sink: W, scratch_limit: usize) -> Self {
        Self {
            keystream,
            sink,
            scratch: ScratchCache::new(scratch_limit),
            stats: CipherStats::default(),
            closed: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }
}

impl<W: CloseableWrite + Send> CipherStream for CachedStream<W> {
    fn strategy(&self) -> CipherStrategy {
        CipherStrategy::Cached
    }

    fn write_chunk(&mut self, src: &[u8]) -> Result<usize, CipherError> {
        if self.closed {
            return Err(CipherError::Closed);
        }
        if src.is_empty() {
            return Ok(0);
        }

        let out = self.scratch.get_mut(src.len());
        self.keystream
            .apply_keystream_b2b(src, out)
            .map_err(|e| CipherError::Keystream(e.to_string()))?;
        let n = forward(&mut self.sink, out)?;

        self.stats.writes += 1;
        self.stats.bytes_in += src.len() as u64;
        self.stats.bytes_out += n as u64;
        Ok(n)
    }

    /// The caller's buffer is the output buffer here as well; the scratch
    /// cache is bypassed.
    fn write_in_place(&mut self, buf: &mut [u8]) -> Result<usize, CipherError> {
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

    fn close(&mut self) -> Result<(), CipherError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(
            cached_lengths = self.scratch.len(),
            footprint = self.scratch.footprint(),
            "closing cached cipher stream"
        );
        self.sink.close().map_err(CipherError::Io)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn stats(&self) -> CipherStats {
        CipherStats {
            scratch_hits: self.scratch.hits,
            scratch_misses: self.scratch.misses,
            scratch_evictions: self.scratch.evictions,
            scratch_buffers: self.scratch.len(),
            ..self.stats
        }
    }
}

impl<W: CloseableWrite + Send> Write for CachedStream<W> {
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
