//! Elastic in-memory buffer between a fast producer and a slow consumer.
//!
//! The pump copies bytes from one nonblocking input to one nonblocking
//! output. Input is accepted as fast as it arrives until a configured
//! ceiling of buffered bytes is reached, then it is left unread until the
//! output catches up. Nothing is ever written to disk.
//!
//! # Architecture
//!
//! - **BufferQueue**: FIFO of chunks, one per read call, with an O(1)
//!   occupancy counter and a reclamation hook for old under-filled chunks
//! - **Flow**: pure backpressure policy deciding which endpoints to wait on
//! - **Driver**: nonblocking read/write paths, error classification, counters
//! - **Pump**: `poll(2)` loop that ties the driver to readiness events
//! - **Shutdown**: signals delivered into the loop through a self-pipe
//! - **PumpBuilder**: fluent construction of a pump
//! - **Progress**: periodic progress line on stderr

pub mod buffer;
mod builder;
pub mod cli;
pub mod config;
mod error;
pub mod flow;
pub mod progress;
pub mod reactor;
pub mod shutdown;
pub mod stats;

pub use builder::PumpBuilder;
pub use config::Config;
pub use error::{Error, Result};
pub use reactor::{Completion, Endpoint, Pump};
pub use shutdown::{Notifier, Shutdown, StopLevel};
pub use stats::Stats;
