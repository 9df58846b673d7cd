//! Cooperative shutdown on SIGINT, SIGHUP and SIGTERM.
//!
//! Signals are turned into bytes on a nonblocking self-pipe. The read end
//! is part of the event loop's poll set, so a signal wakes the wait like any
//! other readiness event, and the stop state itself lives in the
//! [`Shutdown`] value owned by the caller of [`Pump::run`](crate::Pump::run).
//! The handler only loads an atomic and calls `write(2)`.
//!
//! The first stop request closes the input and lets queued data drain. A
//! second delivery of that same signal forces the loop to exit with whatever
//! is still queued; other stop signals during the drain are absorbed.
//! SIGPIPE is ignored so a reader that goes away shows up as an `EPIPE`
//! write error instead of killing the process.

use crate::error::{Error, Result};
use crate::reactor::endpoint::set_nonblocking;

use libc::{
    F_GETFD, F_SETFD, FD_CLOEXEC, SIG_DFL, SIG_IGN, SIGHUP, SIGINT, SIGPIPE, SIGTERM, c_int,
    close, dup, fcntl, pipe, read, sigaction, sigemptyset, write,
};
use log::debug;
use std::cell::Cell;
use std::io;
use std::mem;
use std::os::unix::io::RawFd;
use std::ptr;
use std::sync::atomic::{AtomicI32, Ordering};

/// Write end of the pipe used by the installed signal handler.
static SIGNAL_PIPE: AtomicI32 = AtomicI32::new(-1);

const STOP_SIGNALS: [c_int; 3] = [SIGINT, SIGHUP, SIGTERM];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopLevel {
    #[default]
    Running,
    /// Stop accepting input, finish writing what is queued.
    Requested,
    /// Exit now, discarding queued data.
    Forced,
}

impl StopLevel {
    pub fn is_requested(self) -> bool {
        self != StopLevel::Running
    }

}

pub struct Shutdown {
    reader: RawFd,
    writer: RawFd,
    level: Cell<StopLevel>,
    /// Signal that moved the level out of `Running`.
    first_signal: Cell<Option<u8>>,
    installed: Cell<bool>,
}

impl Shutdown {
    /// Creates the wake channel. No signal disposition is changed until
    /// [`install`](Self::install) is called.
    pub fn new() -> Result<Self> {
        let mut fds = [0i32; 2];
        let res = unsafe { pipe(fds.as_mut_ptr()) };
        if res < 0 {
            return Err(Error::Setup {
                what: "create the shutdown pipe",
                source: io::Error::last_os_error(),
            });
        }

        let shutdown = Self {
            reader: fds[0],
            writer: fds[1],
            level: Cell::new(StopLevel::Running),
            first_signal: Cell::new(None),
            installed: Cell::new(false),
        };

        for file_descriptor in fds {
            set_nonblocking(file_descriptor)
                .and_then(|()| set_cloexec(file_descriptor))
                .map_err(|source| Error::Setup {
                    what: "configure the shutdown pipe",
                    source,
                })?;
        }

        Ok(shutdown)
    }

    /// Routes SIGINT, SIGHUP and SIGTERM into this coordinator and ignores
    /// SIGPIPE. Only one coordinator can be installed at a time.
    pub fn install(&self) -> Result<()> {
        if SIGNAL_PIPE
            .compare_exchange(-1, self.writer, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Signal(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "another shutdown coordinator is installed",
            )));
        }

        let handler = on_signal as extern "C" fn(c_int) as libc::sighandler_t;
        let installed = STOP_SIGNALS
            .iter()
            .try_for_each(|&signal| set_disposition(signal, handler))
            .and_then(|()| set_disposition(SIGPIPE, SIG_IGN));

        if let Err(error) = installed {
            self.restore();
            return Err(Error::Signal(error));
        }

        self.installed.set(true);
        debug!("shutdown handlers installed");

        Ok(())
    }

    /// Handle that requests a stop through the same channel as a signal.
    pub fn notifier(&self) -> Result<Notifier> {
        let writer = unsafe { dup(self.writer) };
        if writer < 0 {
            return Err(Error::Setup {
                what: "duplicate the shutdown pipe",
                source: io::Error::last_os_error(),
            });
        }

        Ok(Notifier { writer })
    }

    /// Consumes pending stop requests and returns the resulting level.
    pub fn observe(&self) -> StopLevel {
        let mut buf = [0u8; 32];

        loop {
            let n = unsafe { read(self.reader, buf.as_mut_ptr() as *mut _, buf.len()) };
            if n <= 0 {
                break;
            }

            for &signal in &buf[..n as usize] {
                self.record(signal);
            }
        }

        self.level.get()
    }

    fn record(&self, signal: u8) {
        let level = match (self.level.get(), self.first_signal.get()) {
            (StopLevel::Running, _) => {
                self.first_signal.set(Some(signal));
                StopLevel::Requested
            }
            (StopLevel::Requested, Some(first)) if first == signal => StopLevel::Forced,
            (level, _) => level,
        };

        debug!("stop request (signal {signal}), now {level:?}");
        self.level.set(level);
    }

    /// Level as of the last [`observe`](Self::observe).
    pub fn level(&self) -> StopLevel {
        self.level.get()
    }

    pub(crate) fn wake_fd(&self) -> RawFd {
        self.reader
    }

    fn restore(&self) {
        for signal in STOP_SIGNALS {
            let _ = set_disposition(signal, SIG_DFL);
        }
        let _ = SIGNAL_PIPE.compare_exchange(self.writer, -1, Ordering::SeqCst, Ordering::SeqCst);
    }
}

impl Drop for Shutdown {
    fn drop(&mut self) {
        if self.installed.get() {
            self.restore();
        }

        unsafe {
            close(self.reader);
            close(self.writer);
        }
    }
}

/// Requests a stop from outside the signal handler. Each call counts as one
/// SIGTERM.
#[derive(Debug)]
pub struct Notifier {
    writer: RawFd,
}

impl Notifier {
    pub fn notify(&self) -> io::Result<()> {
        let byte = SIGTERM as u8;
        let res = unsafe { write(self.writer, &byte as *const u8 as *const _, 1) };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        unsafe {
            close(self.writer);
        }
    }
}

extern "C" fn on_signal(signal: c_int) {
    let writer = SIGNAL_PIPE.load(Ordering::SeqCst);
    if writer < 0 {
        return;
    }

    let saved = errno();
    let byte = signal as u8;
    unsafe {
        write(writer, &byte as *const u8 as *const _, 1);
    }
    set_errno(saved);
}

fn set_disposition(signal: c_int, handler: libc::sighandler_t) -> io::Result<()> {
    let res = unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        action.sa_sigaction = handler;
        action.sa_flags = 0;
        sigemptyset(&mut action.sa_mask);
        sigaction(signal, &action, ptr::null_mut())
    };

    if res < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

fn set_cloexec(file_descriptor: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(file_descriptor, F_GETFD) };
    if flags < 0 || unsafe { fcntl(file_descriptor, F_SETFD, flags | FD_CLOEXEC) } < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn errno_location() -> *mut c_int {
    unsafe { libc::__error() }
}

#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
fn errno_location() -> *mut c_int {
    unsafe { libc::__errno_location() }
}

fn errno() -> c_int {
    unsafe { *errno_location() }
}

fn set_errno(value: c_int) {
    unsafe {
        *errno_location() = value;
    }
}
