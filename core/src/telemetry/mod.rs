// ## src/telemetry/mod.rs

//! telemetry/mod.rs
//! Counters, stage timers, and the immutable snapshot a successful close returns.
//!
//! Notes:
//! - Counters are pulled from the layers themselves (encoder, gzip, cipher), so
//!   no layer needs shared mutable state.
//! - The snapshot is serde-serializable for callers that ship it to their own
//!   metrics pipeline.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
