//! Memory reclamation hooks run by [`BufferQueue`](super::BufferQueue).
//!
//! Read storage is reserved at the full read unit up front. Chunks that end
//! up small (the short read before end of input, bursts of tiny writes from
//! the producer) would otherwise keep that full reservation for as long as
//! they sit in the queue. A hook is called after every append and may shrink
//! chunks through [`Chunks`], which cannot change how many bytes are owed.

use super::chunk::Chunk;

use log::trace;
use std::collections::VecDeque;

/// Mutable view over the queued chunks handed to a [`Maintenance`] hook.
///
/// Only storage can be changed through it. Chunks cannot be added, removed
/// or advanced, so the queue's byte counter stays correct.
pub struct Chunks<'a> {
    chunks: &'a mut VecDeque<Chunk>,
}

impl<'a> Chunks<'a> {
    pub(crate) fn new(chunks: &'a mut VecDeque<Chunk>) -> Self {
        Self { chunks }
    }

    /// Number of queued chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Shrinks the chunk at `index` to its unwritten length. Returns the
    /// number of bytes of capacity released.
    pub fn shrink(&mut self, index: usize) -> usize {
        match self.chunks.get_mut(index) {
            Some(chunk) => {
                let before = chunk.capacity();
                chunk.shrink_to(chunk.remaining());
                before.saturating_sub(chunk.capacity())
            }
            None => 0,
        }
    }
}

/// Hook invoked by the queue after each append.
pub trait Maintenance {
    fn after_append(&mut self, chunks: Chunks<'_>);
}

/// Periodic shrink of under-filled chunks deep in the queue.
///
/// Once the queue holds at least `threshold` chunks, each append inspects
/// the chunk `threshold` entries back from the tail. If it owes at most
/// `max_remaining` bytes and its storage is larger than that, the storage
/// is reallocated down to exactly what is owed. Each chunk passes that
/// position once, so the cost is one check per append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthShrink {
    threshold: usize,
    max_remaining: usize,
}

impl DepthShrink {
    pub const DEFAULT_THRESHOLD: usize = 16;

    /// Policy for a queue fed with reads of up to `read_unit` bytes: chunks
    /// owing at most half a read unit are shrunk.
    pub fn new(read_unit: usize) -> Self {
        Self::with_threshold(Self::DEFAULT_THRESHOLD, read_unit / 2)
    }

    pub fn with_threshold(threshold: usize, max_remaining: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            max_remaining,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Maintenance for DepthShrink {
    fn after_append(&mut self, mut chunks: Chunks<'_>) {
        if chunks.len() < self.threshold {
            return;
        }

        let index = chunks.len() - self.threshold;
        let Some(chunk) = chunks.get(index) else {
            return;
        };

        if chunk.remaining() <= self.max_remaining && chunk.capacity() > chunk.remaining() {
            let released = chunks.shrink(index);
            trace!("shrunk chunk {index} of {}, released {released} bytes", chunks.len());
        }
    }
}

/// Disables reclamation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMaintenance;

impl Maintenance for NoMaintenance {
    fn after_append(&mut self, _chunks: Chunks<'_>) {}
}
