use super::chunk::Chunk;
use super::maintenance::{Chunks, DepthShrink, Maintenance};
use crate::error::Result;

use std::collections::VecDeque;

/// FIFO of chunks waiting to be written, oldest first.
///
/// `buffered()` is kept equal to the sum of the unwritten bytes of every
/// queued chunk, so occupancy checks are O(1).
#[derive(Debug)]
pub struct BufferQueue<M = DepthShrink> {
    chunks: VecDeque<Chunk>,
    buffered: usize,
    maintenance: M,
}

impl BufferQueue<DepthShrink> {
    /// Creates an empty queue with the default shrink policy for reads of
    /// `read_unit` bytes.
    pub fn new(read_unit: usize) -> Self {
        Self::with_maintenance(DepthShrink::new(read_unit))
    }
}

impl<M: Maintenance> BufferQueue<M> {
    pub fn with_maintenance(maintenance: M) -> Self {
        Self {
            chunks: VecDeque::new(),
            buffered: 0,
            maintenance,
        }
    }

    /// Queues a copy of `bytes` as one new chunk. Chunks are never merged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let chunk = Chunk::from_slice(bytes)?;
        self.push_chunk(chunk);

        Ok(())
    }

    /// Queues an already filled chunk. Chunks owing nothing are dropped.
    pub fn push_chunk(&mut self, chunk: Chunk) {
        if chunk.remaining() == 0 {
            return;
        }

        self.buffered += chunk.remaining();
        self.chunks.push_back(chunk);
        self.shrink_old_chunks();
    }

    /// Unwritten bytes of the oldest chunk, or an empty slice.
    pub fn front(&self) -> &[u8] {
        match self.chunks.front() {
            Some(chunk) => chunk.unwritten(),
            None => &[],
        }
    }

    /// Marks `n` bytes of the oldest chunk as written, removing the chunk
    /// once it is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than `front().len()`.
    pub fn consume_front(&mut self, n: usize) {
        if n == 0 {
            return;
        }

        let Some(chunk) = self.chunks.front_mut() else {
            panic!("consume_front({n}) on an empty queue");
        };

        if chunk.advance(n) {
            self.chunks.pop_front();
        }
        self.buffered -= n;
    }

    /// Runs the maintenance hook over the queued chunks.
    pub fn shrink_old_chunks(&mut self) {
        self.maintenance.after_append(Chunks::new(&mut self.chunks));
    }

    /// Unwritten bytes across all chunks.
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Number of queued chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn maintenance(&self) -> &M {
        &self.maintenance
    }
}
