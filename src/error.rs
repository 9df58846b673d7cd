//! Error type shared by the pump, its setup helpers and the binary.
//!
//! Only conditions that end the process are represented here. Transient I/O
//! results (`WouldBlock`, `Interrupted`) and input-side failures are absorbed
//! by the driver and never become an [`Error`].

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a maximum queue size greater than zero is required")]
    MissingCeiling,

    #[error("read size must be greater than zero")]
    ZeroReadUnit,

    #[error("invalid {what}: '{value}'")]
    InvalidSize { what: &'static str, value: String },

    #[error("could not allocate {requested} bytes of buffer storage")]
    Allocation { requested: usize },

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("readiness wait failed: {0}")]
    Poll(#[source] io::Error),

    #[error("output reported an error condition instead of becoming writable")]
    OutputNotReady,

    #[error("could not {what}: {source}")]
    Setup {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("could not install signal handlers: {0}")]
    Signal(#[source] io::Error),
}
