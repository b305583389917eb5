// ## src/compression/mod.rs

//! compression/mod.rs
//! Streaming gzip layer that sits between the record encoder and the cipher.
//!
//! Notes:
//! - One gzip member per stream; the trailer (CRC32 + ISIZE) is only emitted by
//!   `GzipLayer::finish`, which must run while the cipher below is still open.
//! - The level is validated up front so a bad config never reaches flate2.

pub mod types;
pub mod gzip;

pub use types::*;
pub use gzip::*;
