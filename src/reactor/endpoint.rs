//! Raw descriptor endpoints.
//!
//! `Endpoint` reads and writes a file descriptor with single `read(2)` and
//! `write(2)` calls, so every short count and `EAGAIN` reaches the driver
//! unchanged. Descriptors 0 and 1 are borrowed and left open on drop; pipe
//! ends and descriptors adopted through [`FromRawFd`] are closed.

use libc::{F_GETFL, F_SETFL, O_NONBLOCK, close, fcntl, pipe, read, write};
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};

#[derive(Debug)]
pub struct Endpoint {
    file_descriptor: RawFd,
    owned: bool,
}

impl Endpoint {
    pub fn stdin() -> Self {
        Self {
            file_descriptor: libc::STDIN_FILENO,
            owned: false,
        }
    }

    pub fn stdout() -> Self {
        Self {
            file_descriptor: libc::STDOUT_FILENO,
            owned: false,
        }
    }

    /// Creates an anonymous pipe and returns `(read end, write end)`.
    pub fn pipe() -> io::Result<(Self, Self)> {
        let mut fds = [0i32; 2];
        let res = unsafe { pipe(fds.as_mut_ptr()) };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }

        let reader = Self {
            file_descriptor: fds[0],
            owned: true,
        };
        let writer = Self {
            file_descriptor: fds[1],
            owned: true,
        };

        Ok((reader, writer))
    }

    /// Puts the descriptor in nonblocking mode.
    pub fn set_nonblocking(&self) -> io::Result<()> {
        set_nonblocking(self.file_descriptor)
    }
}

pub(crate) fn set_nonblocking(file_descriptor: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(file_descriptor, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    if flags & O_NONBLOCK != 0 {
        return Ok(());
    }

    let res = unsafe { fcntl(file_descriptor, F_SETFL, flags | O_NONBLOCK) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

impl Read for Endpoint {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = unsafe { read(self.file_descriptor, buf.as_mut_ptr() as *mut _, buf.len()) };

        if result < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(result as usize)
    }
}

impl Write for Endpoint {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = unsafe { write(self.file_descriptor, buf.as_ptr() as *const _, buf.len()) };

        if result < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(result as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AsRawFd for Endpoint {
    fn as_raw_fd(&self) -> RawFd {
        self.file_descriptor
    }
}

impl FromRawFd for Endpoint {
    /// Adopts `file_descriptor`; it is closed when the endpoint is dropped.
    unsafe fn from_raw_fd(file_descriptor: RawFd) -> Self {
        Self {
            file_descriptor,
            owned: true,
        }
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        if self.owned {
            unsafe {
                close(self.file_descriptor);
            }
        }
    }
}
