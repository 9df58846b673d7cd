//! Nonblocking read and write paths between the endpoints and the queue.
//!
//! The driver owns the [`BufferQueue`], the end-of-input state and the run
//! counters. It resolves every recoverable I/O condition locally: the only
//! error it returns from a read is an allocation failure, and from a write
//! anything other than `WouldBlock` or `Interrupted`.

use crate::buffer::{BufferQueue, Chunk, DepthShrink, Maintenance};
use crate::error::{Error, Result};
use crate::flow::{FlowState, Interest, interest};
use crate::stats::{Counters, Stats};

use log::{debug, trace, warn};
use std::io::{self, ErrorKind, Read, Write};

/// Result of one [`Driver::read_from`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadStatus {
    /// A chunk of this many bytes was queued.
    Data(usize),
    /// The input reported end of stream.
    EndOfInput,
    /// The input failed; it is treated as closed from now on.
    Failed,
    /// Nothing available yet.
    WouldBlock,
    /// The queue is at the ceiling, no read was issued.
    Full,
    /// Interrupted while a stop was pending; nothing was committed.
    Abandoned,
}

/// Result of one [`Driver::write_to`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    /// Every queued chunk was written.
    Drained,
    /// The output took part of a chunk and is saturated for now.
    Partial,
    /// The output would block or the call was interrupted.
    Blocked,
}

/// Where the transfer stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Accepting input.
    Running,
    /// No more input will be accepted; queued data is still being written.
    Draining,
    /// Nothing left to do.
    Done,
}

pub struct Driver<M = DepthShrink> {
    queue: BufferQueue<M>,
    ceiling: usize,
    read_unit: usize,
    end_of_input: bool,
    input_error: Option<io::Error>,
    counters: Counters,
}

impl Driver<DepthShrink> {
    pub fn new(ceiling: usize, read_unit: usize) -> Self {
        Self::with_queue(ceiling, read_unit, BufferQueue::new(read_unit))
    }
}

impl<M: Maintenance> Driver<M> {
    pub fn with_queue(ceiling: usize, read_unit: usize, queue: BufferQueue<M>) -> Self {
        Self {
            queue,
            ceiling,
            read_unit,
            end_of_input: false,
            input_error: None,
            counters: Counters::default(),
        }
    }

    /// Issues at most one read on `input` and queues what it returns.
    ///
    /// The request never exceeds the headroom left below the ceiling. An
    /// interrupted read is retried unless `stop_requested` reports a
    /// pending shutdown.
    pub fn read_from<R, F>(&mut self, input: &mut R, mut stop_requested: F) -> Result<ReadStatus>
    where
        R: Read + ?Sized,
        F: FnMut() -> bool,
    {
        if self.end_of_input {
            return Ok(ReadStatus::EndOfInput);
        }

        let headroom = self.ceiling.saturating_sub(self.queue.buffered());
        let request = self.read_unit.min(headroom);
        if request == 0 {
            return Ok(ReadStatus::Full);
        }

        let mut chunk = Chunk::with_capacity(request)?;

        loop {
            match chunk.fill_from(input, request) {
                Ok(0) => {
                    debug!(
                        "end of input after {} bytes in {} reads",
                        self.counters.bytes_read, self.counters.reads
                    );
                    self.end_of_input = true;

                    return Ok(ReadStatus::EndOfInput);
                }
                Ok(n) => {
                    self.queue.push_chunk(chunk);
                    self.counters.bytes_read += n as u64;
                    self.counters.reads += 1;
                    trace!("read {n} bytes, {} buffered", self.queue.buffered());

                    return Ok(ReadStatus::Data(n));
                }
                Err(error) if error.kind() == ErrorKind::WouldBlock => {
                    return Ok(ReadStatus::WouldBlock);
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => {
                    if stop_requested() {
                        return Ok(ReadStatus::Abandoned);
                    }
                }
                Err(error) => {
                    warn!("failed to read from input: {error}");
                    self.end_of_input = true;
                    self.input_error = Some(error);

                    return Ok(ReadStatus::Failed);
                }
            }
        }
    }

    /// Writes queued chunks to `output` until the queue is empty or the
    /// output stops accepting data.
    pub fn write_to<W: Write + ?Sized>(&mut self, output: &mut W) -> Result<WriteStatus> {
        while !self.queue.is_empty() {
            let pending = self.queue.front().len();

            match output.write(self.queue.front()) {
                Ok(written) => {
                    let written = written.min(pending);
                    self.queue.consume_front(written);
                    self.counters.writes += 1;
                    trace!("wrote {written} of {pending} bytes, {} buffered", self.queue.buffered());

                    if written < pending {
                        return Ok(WriteStatus::Partial);
                    }
                }
                Err(error)
                    if matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) =>
                {
                    return Ok(WriteStatus::Blocked);
                }
                Err(error) => return Err(Error::Write(error)),
            }
        }

        Ok(WriteStatus::Drained)
    }

    pub fn flow_state(&self, stopping: bool) -> FlowState {
        FlowState {
            end_of_input: self.end_of_input,
            stopping,
            buffered: self.queue.buffered(),
            ceiling: self.ceiling,
            queued_chunks: self.queue.len(),
        }
    }

    pub fn interest(&self, stopping: bool) -> Interest {
        interest(&self.flow_state(stopping))
    }

    pub fn phase(&self, stopping: bool) -> Phase {
        let closed = self.end_of_input || stopping;

        match (closed, self.queue.is_empty()) {
            (true, true) => Phase::Done,
            (true, false) => Phase::Draining,
            (false, _) => Phase::Running,
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            bytes_read: self.counters.bytes_read,
            buffered: self.queue.buffered(),
            ceiling: self.ceiling,
            depth: self.queue.len(),
            reads: self.counters.reads,
            writes: self.counters.writes,
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn queue(&self) -> &BufferQueue<M> {
        &self.queue
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn read_unit(&self) -> usize {
        self.read_unit
    }

    pub fn is_end_of_input(&self) -> bool {
        self.end_of_input
    }

    /// The read error that closed the input, if it did not end cleanly.
    pub fn input_error(&self) -> Option<&io::Error> {
        self.input_error.as_ref()
    }

    pub(crate) fn take_input_error(&mut self) -> Option<io::Error> {
        self.input_error.take()
    }
}
