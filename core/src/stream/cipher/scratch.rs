//! stream/cipher/scratch.rs
//! Length-keyed scratch buffers for the cached strategy.
//!
//! Design notes:
//! - One buffer per distinct chunk length, allocated on first sight and reused
//!   for every later chunk of the same length.
//! - Bounded: once `limit` lengths are cached, the least recently used length is
//!   evicted before a new one is allocated.

use std::collections::HashMap;

#[derive(Debug)]
struct Slot {
    buf: Vec<u8>,
    last_used: u64,
}

#[derive(Debug)]
pub struct ScratchCache {
    slots: HashMap<usize, Slot>,
    limit: usize,
    tick: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl ScratchCache {
    /// `limit` is clamped to at least one slot.
    pub fn new(limit: usize) -> Self {
        Self {
            slots: HashMap::new(),
            limit: limit.max(1),
            tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Scratch buffer of exactly `len` bytes. Contents are stale ciphertext.
    pub fn get_mut(&mut self, len: usize) -> &mut [u8] {
        self.tick += 1;
        if self.slots.contains_key(&len) {
            self.hits += 1;
        } else {
            self.misses += 1;
            if self.slots.len() >= self.limit {
                self.evict_lru();
            }
            tracing::trace!(len, cached = self.slots.len(), "allocating scratch buffer");
        }

        let tick = self.tick;
        let slot = self
            .slots
            .entry(len)
            .or_insert_with(|| Slot { buf: vec![0u8; len], last_used: tick });
        slot.last_used = tick;
        &mut slot.buf
    }

    fn evict_lru(&mut self) {
        let victim = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(len, _)| *len);
        if let Some(len) = victim {
            self.slots.remove(&len);
            self.evictions += 1;
            tracing::trace!(len, "evicted scratch buffer");
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, len: usize) -> bool {
        self.slots.contains_key(&len)
    }

    /// Total bytes held across all cached buffers.
    pub fn footprint(&self) -> usize {
        self.slots.values().map(|s| s.buf.len()).sum()
    }
}
