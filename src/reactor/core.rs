//! The readiness loop.
//!
//! Each iteration observes the shutdown channel, checks for completion,
//! derives interest from the queue state, waits in `poll(2)` and dispatches
//! to the driver. Nothing else in the process blocks.

use crate::buffer::{DepthShrink, Maintenance};
use crate::error::{Error, Result};
use crate::progress::{Progress, Ticker};
use crate::reactor::driver::{Driver, Phase};
use crate::reactor::poller::Poller;
use crate::shutdown::{Shutdown, StopLevel};
use crate::stats::Stats;

use log::{debug, warn};
use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::io::AsRawFd;
use std::time::Instant;

/// How a transfer ended without a fatal error.
#[derive(Debug)]
pub enum Completion {
    /// End of input was reached and everything read was written.
    Finished,
    /// Everything read was written, but the input ended with an error.
    InputFailed(io::Error),
    /// A stop was requested and everything already read was written.
    Stopped,
    /// The drain after a stop request was cut short.
    Abandoned { discarded: usize },
}

impl Completion {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Completion::Finished | Completion::Stopped => 0,
            Completion::Abandoned { .. } => 1,
            Completion::InputFailed(_) => 2,
        }
    }
}

/// Copies one input to one output through a bounded queue.
///
/// Built with [`PumpBuilder`](crate::PumpBuilder).
pub struct Pump<M = DepthShrink> {
    driver: Driver<M>,
    poller: Poller,
    progress: Option<(Box<dyn Progress>, Ticker)>,
}

impl<M: Maintenance> Pump<M> {
    pub(crate) fn new(driver: Driver<M>, progress: Option<(Box<dyn Progress>, Ticker)>) -> Self {
        Self {
            driver,
            poller: Poller::new(),
            progress,
        }
    }

    /// Runs until the input is exhausted and drained, a stop completes, or
    /// a fatal error occurs. Both endpoints must be nonblocking.
    ///
    /// A final progress report is emitted on every exit path.
    pub fn run<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
        shutdown: &Shutdown,
    ) -> Result<Completion>
    where
        I: Read + AsRawFd + ?Sized,
        O: Write + AsRawFd + ?Sized,
    {
        let result = self.transfer(input, output, shutdown);

        let stats = self.driver.stats();
        if let Some((progress, _)) = &mut self.progress {
            progress.report(&stats);
        }

        result
    }

    fn transfer<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
        shutdown: &Shutdown,
    ) -> Result<Completion>
    where
        I: Read + AsRawFd + ?Sized,
        O: Write + AsRawFd + ?Sized,
    {
        loop {
            let stop = shutdown.observe();
            if stop == StopLevel::Forced {
                return Ok(self.abandon());
            }

            let stopping = stop.is_requested();
            if self.driver.phase(stopping) == Phase::Done {
                return Ok(self.finish());
            }

            let interest = self.driver.interest(stopping);
            let timeout = self
                .progress
                .as_ref()
                .map(|(_, ticker)| ticker.remaining(Instant::now()));

            let ready = match self.poller.wait(
                input.as_raw_fd(),
                output.as_raw_fd(),
                shutdown.wake_fd(),
                interest,
                timeout,
            ) {
                Ok(ready) => ready,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(Error::Poll(error)),
            };

            self.tick(ready.timed_out);
            if ready.timed_out {
                continue;
            }

            if ready.input {
                self.driver
                    .read_from(input, || shutdown.observe().is_requested())?;
            }

            if ready.output {
                if let Err(error) = self.driver.write_to(output) {
                    if shutdown.observe().is_requested() {
                        warn!("stopping drain: {error}");
                        return Ok(self.abandon());
                    }

                    return Err(error);
                }
            } else if ready.output_failed {
                if shutdown.observe().is_requested() {
                    warn!("stopping drain: output closed");
                    return Ok(self.abandon());
                }

                return Err(Error::OutputNotReady);
            }
        }
    }

    fn tick(&mut self, timed_out: bool) {
        let stats = self.driver.stats();

        if let Some((progress, ticker)) = &mut self.progress {
            if ticker.due(Instant::now(), timed_out) {
                progress.report(&stats);
            }
        }
    }

    fn finish(&mut self) -> Completion {
        if !self.driver.is_end_of_input() {
            debug!("stopped after draining {} bytes", self.driver.counters().bytes_read);
            return Completion::Stopped;
        }

        match self.driver.take_input_error() {
            Some(error) => Completion::InputFailed(error),
            None => Completion::Finished,
        }
    }

    fn abandon(&self) -> Completion {
        let discarded = self.driver.queue().buffered();
        if discarded > 0 {
            warn!("exiting with {discarded} bytes still buffered");
        }

        Completion::Abandoned { discarded }
    }

    pub fn stats(&self) -> Stats {
        self.driver.stats()
    }

    pub fn driver(&self) -> &Driver<M> {
        &self.driver
    }
}
