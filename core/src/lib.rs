//! sealstream-core
//!
//! Streaming writer for confidential record sets: CSV records are gzip
//! compressed, encrypted with AES-256-CTR under a fresh per-stream key, and
//! prefixed with that key wrapped for one RSA recipient (OAEP, SHA-256).
//!
//! Confidentiality only: there is no MAC or AEAD over the payload.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

pub mod compression;
pub mod crypto;
pub mod telemetry;

// Writer layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::stream::{
        CipherStrategy, CloseableWrite, OutputSink, SealedWriter, SharedBuffer, WriterConfig,
        WriterState,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::StreamError;
}
