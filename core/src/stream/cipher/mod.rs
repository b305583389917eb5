//! stream/cipher: counter-mode transform over the raw sink.
//!
//! Design notes:
//! - CTR is chunk-boundary independent: any split of the same plaintext, fed
//!   in order, yields the same ciphertext.
//! - Two strategies behind `CipherStream`, selected by `WriterConfig`; they
//!   must stay byte-for-byte equivalent.
//! - The optional `BufferedSink` is composed underneath either strategy.

pub mod types;
pub mod scratch;
pub mod in_place;
pub mod cached;

pub use types::*;
pub use scratch::ScratchCache;
pub use in_place::InPlaceStream;
pub use cached::CachedStream;

use crate::crypto::Aes256Ctr;
use crate::stream::buffered::BufferedSink;
use crate::stream::config::{CipherStrategy, WriterConfig};
use crate::stream::io::{CloseableWrite, OutputSink};

/// Build the configured cipher strategy over `sink`.
pub fn build_cipher_stream(
    config: &WriterConfig,
    keystream: Aes256Ctr,
    sink: OutputSink,
) -> Box<dyn CipherStream> {
    tracing::debug!(
        strategy = ?config.strategy,
        buffered = config.buffered,
        "building cipher stream"
    );
    if config.buffered {
        let buffered = BufferedSink::with_capacity(sink, config.buffer_capacity);
        with_strategy(config, keystream, buffered)
    } else {
        with_strategy(config, keystream, sink)
    }
}

fn with_strategy<W>(config: &WriterConfig, keystream: Aes256Ctr, sink: W) -> Box<dyn CipherStream>
where
    W: CloseableWrite + Send + 'static,
{
    match config.strategy {
        CipherStrategy::InPlace => Box::new(InPlaceStream::new(keystream, sink)),
        CipherStrategy::Cached => {
            Box::new(CachedStream::new(keystream, sink, config.scratch_cache_limit))
        }
    }
}
