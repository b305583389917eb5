// ## 📂 File: `src/stream/cipher/types.rs`

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::stream::config::CipherStrategy;

#[derive(Debug)]
pub enum CipherError {
    /// Downstream accepted fewer bytes than requested and reported no error.
    ShortWrite { requested: usize, written: usize },

    /// Write after close.
    Closed,

    /// Keystream application failed (length mismatch or counter exhausted).
    Keystream(String),

    /// Downstream I/O error, passed through unchanged.
    Io(io::Error),
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CipherError::*;
        match self {
            ShortWrite { requested, written } =>
                write!(f, "short write: requested={}, written={}", requested, written),
            Closed =>
                write!(f, "cipher stream is closed"),
            Keystream(msg) =>
                write!(f, "keystream error: {}", msg),
            Io(e) =>
                write!(f, "downstream I/O error: {}", e),
        }
    }
}

impl std::error::Error for CipherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CipherError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl CipherError {
    /// Convert for the `io::Write` boundary.
    ///
    /// Downstream errors keep their original kind; cipher-level failures are
    /// wrapped so `StreamError::from_io` can recover them.
    pub fn into_io(self) -> io::Error {
        match self {
            CipherError::Io(e) => e,
            CipherError::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, self),
            other => io::Error::other(other),
        }
    }
}

/// Running counters for one cipher stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherStats {
    pub writes: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub scratch_hits: u64,
    pub scratch_misses: u64,
    pub scratch_evictions: u64,
    /// Distinct lengths currently cached.
    pub scratch_buffers: usize,
}

/// Counter-mode transform that forwards ciphertext to the layer below.
///
/// Both strategies keep one keystream cursor; chunks must arrive in order with
/// no gaps or overlaps. `&mut self` on every call is the single-writer rule:
/// at most one write is in flight, so scratch buffers are never aliased.
pub trait CipherStream: Write + Send {
    fn strategy(&self) -> CipherStrategy;

    /// Encrypt `src` and forward the ciphertext. Returns `src.len()` on success.
    fn write_chunk(&mut self, src: &[u8]) -> Result<usize, CipherError>;

    /// Encrypt `buf` **in place** and forward it.
    ///
    /// On return `buf` holds ciphertext, not the caller's plaintext. Only hand
    /// over a buffer whose plaintext contents are no longer needed.
    fn write_in_place(&mut self, buf: &mut [u8]) -> Result<usize, CipherError>;

    /// Close the layer below if it has a close capability. A second call is a no-op.
    fn close(&mut self) -> Result<(), CipherError>;

    fn is_closed(&self) -> bool;

    fn stats(&self) -> CipherStats;
}

impl<C: CipherStream + ?Sized> CipherStream for Box<C> {
    fn strategy(&self) -> CipherStrategy {
        (**self).strategy()
    }

    fn write_chunk(&mut self, src: &[u8]) -> Result<usize, CipherError> {
        (**self).write_chunk(src)
    }

    fn write_in_place(&mut self, buf: &mut [u8]) -> Result<usize, CipherError> {
        (**self).write_in_place(buf)
    }

    fn close(&mut self) -> Result<(), CipherError> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn stats(&self) -> CipherStats {
        (**self).stats()
    }
}

/// Forward a finished ciphertext chunk downstream in a single write.
///
/// The keystream has already advanced past `buf`, so a partial write cannot be
/// retried with fresh bytes: fewer bytes accepted without an error is a
/// `ShortWrite`. `Interrupted` is retried since nothing was consumed.
pub(crate) fn forward<W: Write + ?Sized>(sink: &mut W, buf: &[u8]) -> Result<usize, CipherError> {
    loop {
        match sink.write(buf) {
            Ok(n) if n == buf.len() => return Ok(n),
            Ok(n) => {
                return Err(CipherError::ShortWrite { requested: buf.len(), written: n })
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CipherError::Io(e)),
        }
    }
}
