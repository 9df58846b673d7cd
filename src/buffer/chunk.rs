use crate::error::{Error, Result};

use std::io::{self, Read};

/// One buffered unit of bytes, produced by a single read call.
///
/// The storage is a plain `Vec<u8>`. `len()` is the number of stored bytes
/// and `offset()` the prefix that has already been written out. Bytes in
/// `offset..len` are still owed to the output.
#[derive(Debug, Default)]
pub struct Chunk {
    data: Vec<u8>,
    offset: usize,
}

impl Chunk {
    /// Creates an empty chunk whose storage can hold exactly `capacity` bytes.
    ///
    /// The reservation is fallible so an exhausted allocator is reported as
    /// [`Error::Allocation`] instead of aborting inside the allocator.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| Error::Allocation {
                requested: capacity,
            })?;

        Ok(Self { data, offset: 0 })
    }

    /// Creates a chunk holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut chunk = Self::with_capacity(bytes.len())?;
        chunk.data.extend_from_slice(bytes);

        Ok(chunk)
    }

    /// Replaces the chunk's contents with one `read` call of at most `len`
    /// bytes on `reader`.
    ///
    /// Exactly `len` bytes are offered, whatever the reserved capacity
    /// turned out to be. On error the chunk is left empty.
    pub fn fill_from<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
        len: usize,
    ) -> io::Result<usize> {
        self.data.clear();
        self.data.resize(len, 0);
        self.offset = 0;

        let result = reader.read(&mut self.data);
        let filled = match &result {
            Ok(n) => (*n).min(len),
            Err(_) => 0,
        };
        self.data.truncate(filled);

        result
    }

    /// Total stored bytes, written prefix included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes at the front of the storage that were already written out.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes still owed to the output.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn unwritten(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// Marks `n` more bytes as written. Returns `true` once nothing is left.
    ///
    /// The storage is compacted as soon as the written prefix is at least as
    /// long as what remains, so a chunk that is drained a little at a time
    /// never drags a large dead prefix around.
    pub(crate) fn advance(&mut self, n: usize) -> bool {
        assert!(
            n <= self.remaining(),
            "advance({n}) past the {} unwritten bytes of a chunk",
            self.remaining()
        );

        self.offset += n;
        if self.offset == self.data.len() {
            return true;
        }

        if self.offset >= self.remaining() {
            self.compact();
        }

        false
    }

    /// Shrinks the storage to hold `min_capacity` bytes, never less than the
    /// unwritten bytes. The written prefix is discarded first.
    pub fn shrink_to(&mut self, min_capacity: usize) {
        self.compact();
        self.data.shrink_to(min_capacity.max(self.data.len()));
    }

    fn compact(&mut self) {
        if self.offset > 0 {
            self.data.drain(..self.offset);
            self.offset = 0;
        }
    }
}
