use std::io;

use thiserror::Error;

use crate::{
    compression::CompressionError,
    crypto::CryptoError,
    stream::{cipher::CipherError, state::CloseStage},
};

/// Unified stream error covering every layer of the sealed writer.
/// - Ergonomic `From<T>` impls enable `?` across the pipeline.
/// - Close-time failures keep the failing stage and the sink's original `io::Error`.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The entropy source could not supply bytes.
    #[error("rng failure: {0}")]
    RngFailure(String),

    /// The symmetric key does not fit under the recipient modulus with OAEP padding.
    #[error("key too large for envelope: key={actual} bytes, max={max} bytes")]
    KeyTooLarge { max: usize, actual: usize },

    /// Any other asymmetric wrap failure.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// Downstream sink accepted fewer bytes than requested without an error.
    #[error("short write: requested={requested}, written={written}")]
    ShortWrite { requested: usize, written: usize },

    /// Record validation or serialization failed in the CSV encoder.
    #[error("encoding failure: {0}")]
    EncodingFailure(String),

    /// A flush step of the close sequence failed.
    #[error("flush failure during {stage}: {source}")]
    FlushFailure {
        stage: CloseStage,
        #[source]
        source: io::Error,
    },

    /// A close step of the close sequence failed.
    #[error("close failure during {stage}: {source}")]
    CloseFailure {
        stage: CloseStage,
        #[source]
        source: io::Error,
    },

    /// Sink error on the write path.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid writer configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The writer was already closed, or a previous close failed.
    #[error("writer is closed")]
    Closed,
}

impl StreamError {
    /// The underlying sink error, if this failure came from the sink.
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            StreamError::Io(e)
            | StreamError::FlushFailure { source: e, .. }
            | StreamError::CloseFailure { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<CryptoError> for StreamError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Rng(msg) => StreamError::RngFailure(msg),
            CryptoError::KeyTooLarge { max, actual } => StreamError::KeyTooLarge { max, actual },
            other => StreamError::EncryptionFailure(other.to_string()),
        }
    }
}

impl From<CipherError> for StreamError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::ShortWrite { requested, written } => {
                StreamError::ShortWrite { requested, written }
            }
            CipherError::Closed => StreamError::Closed,
            CipherError::Keystream(msg) => StreamError::EncryptionFailure(msg),
            CipherError::Io(e) => StreamError::Io(e),
        }
    }
}

impl From<CompressionError> for StreamError {
    fn from(e: CompressionError) -> Self {
        match e {
            CompressionError::InvalidLevel { .. } => StreamError::Config(e.to_string()),
            CompressionError::Io(e) => StreamError::from_io(e),
        }
    }
}

impl From<csv::Error> for StreamError {
    fn from(e: csv::Error) -> Self {
        if !e.is_io_error() {
            return StreamError::EncodingFailure(e.to_string());
        }
        match e.into_kind() {
            csv::ErrorKind::Io(io) => StreamError::from_io(io),
            other => StreamError::EncodingFailure(format!("{:?}", other)),
        }
    }
}

impl StreamError {
    /// Map an `io::Error` coming up through the layer stack.
    ///
    /// Cipher failures cross the `io::Write` boundary wrapped in `io::Error::other`;
    /// they are unwrapped here so the caller sees the cipher variant, not `Io`.
    pub fn from_io(e: io::Error) -> Self {
        match unwrap_cipher_error(e) {
            Ok(cipher) => StreamError::from(cipher),
            Err(io) => StreamError::Io(io),
        }
    }
}

/// Recover a `CipherError` wrapped inside an `io::Error`, or give the error back.
pub(crate) fn unwrap_cipher_error(e: io::Error) -> Result<CipherError, io::Error> {
    let carries_cipher = e
        .get_ref()
        .map(|inner| inner.is::<CipherError>())
        .unwrap_or(false);
    if !carries_cipher {
        return Err(e);
    }
    let kind = e.kind();
    match e.into_inner() {
        Some(inner) => match inner.downcast::<CipherError>() {
            Ok(cipher) => Ok(*cipher),
            Err(other) => Err(io::Error::new(kind, other)),
        },
        None => Err(io::Error::from(kind)),
    }
}
