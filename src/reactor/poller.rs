use crate::flow::Interest;

use libc::{POLLIN, POLLOUT, nfds_t, poll, pollfd};
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

const INPUT: usize = 0;
const OUTPUT: usize = 1;
const WAKE: usize = 2;

/// What one wait reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Readiness {
    /// Input is readable, hung up or in error; a read will not block.
    pub(crate) input: bool,
    /// Output accepts writes.
    pub(crate) output: bool,
    /// Output reported an error or hang-up without being writable.
    pub(crate) output_failed: bool,
    /// The timeout expired with nothing ready.
    pub(crate) timed_out: bool,
}

/// `poll(2)` over the input, the output and the wake channel.
///
/// Endpoints without interest are left out of the set (negative descriptor)
/// so hang-up or error conditions on them are not reported either.
pub(crate) struct Poller {
    fds: [pollfd; 3],
}

impl Poller {
    pub(crate) fn new() -> Self {
        let empty = pollfd {
            fd: -1,
            events: 0,
            revents: 0,
        };

        Self { fds: [empty; 3] }
    }

    pub(crate) fn wait(
        &mut self,
        input: RawFd,
        output: RawFd,
        wake: RawFd,
        interest: Interest,
        timeout: Option<Duration>,
    ) -> io::Result<Readiness> {
        self.fds[INPUT] = register(input, POLLIN, interest.read);
        self.fds[OUTPUT] = register(output, POLLOUT, interest.write);
        self.fds[WAKE] = register(wake, POLLIN, true);

        let n_events = unsafe {
            poll(
                self.fds.as_mut_ptr(),
                self.fds.len() as nfds_t,
                timeout_ms(timeout),
            )
        };

        if n_events < 0 {
            return Err(io::Error::last_os_error());
        }

        let output_revents = self.fds[OUTPUT].revents;

        Ok(Readiness {
            input: self.fds[INPUT].revents != 0,
            output: output_revents & POLLOUT != 0,
            output_failed: output_revents != 0 && output_revents & POLLOUT == 0,
            timed_out: n_events == 0,
        })
    }
}

fn register(file_descriptor: RawFd, events: i16, interested: bool) -> pollfd {
    pollfd {
        fd: if interested { file_descriptor } else { -1 },
        events,
        revents: 0,
    }
}

/// Milliseconds for `poll(2)`, rounded up so a sub-millisecond remainder
/// does not turn into a zero timeout and a spin.
fn timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(duration) => {
            let ms = duration.as_nanos().div_ceil(1_000_000);
            ms.min(i32::MAX as u128) as i32
        }
    }
}
