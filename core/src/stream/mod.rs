// ## 1️⃣ `mod.rs`: public façade + re-exports

//! stream: the layered sealed writer.
//!
//! Layers, top to bottom: `RecordEncoder` (CSV) → `GzipLayer` → `CipherStream`
//! (AES-256-CTR) → optional `BufferedSink` → `OutputSink`. Each layer owns the
//! one beneath it. `SealedWriter` composes them and owns the close order.

pub mod config;
pub mod io;
pub mod cipher;
pub mod buffered;
pub mod encoder;
pub mod state;
pub mod core;

pub use config::{CipherStrategy, WriterConfig};
pub use io::{CloseableWrite, OutputSink, SharedBuffer};
pub use cipher::{CipherError, CipherStats, CipherStream};
pub use buffered::BufferedSink;
pub use encoder::RecordEncoder;
pub use state::{CloseStage, WriterState};
pub use core::SealedWriter;
