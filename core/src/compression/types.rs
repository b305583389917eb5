//! compression/types.rs
//! Compression errors.
use std::fmt;
use std::io;

use crate::constants::MAX_COMPRESSION_LEVEL;

#[derive(Debug)]
pub enum CompressionError {
    /// Level outside flate2's 0..=9 range.
    InvalidLevel { level: u32 },
    /// The compressor failed to write or finalize through the layer below.
    Io(io::Error),
}

impl From<io::Error> for CompressionError {
    fn from(e: io::Error) -> Self {
        CompressionError::Io(e)
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompressionError::*;
        match self {
            InvalidLevel { level } =>
                write!(f, "invalid gzip level: {} (allowed 0..={})", level, MAX_COMPRESSION_LEVEL),
            Io(e) =>
                write!(f, "gzip stream error: {}", e),
        }
    }
}

impl std::error::Error for CompressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompressionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Validate a gzip level.
pub fn validate_level(level: u32) -> Result<(), CompressionError> {
    if level > MAX_COMPRESSION_LEVEL {
        return Err(CompressionError::InvalidLevel { level });
    }
    Ok(())
}
