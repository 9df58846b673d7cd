//! Readiness-driven I/O.
//!
//! - [`core`](self::core): the event loop ([`Pump`])
//! - [`driver`]: nonblocking read/write paths and run counters
//! - [`endpoint`]: raw descriptor endpoints
//! - `poller`: `poll(2)` wrapper

pub mod core;
pub mod driver;
pub mod endpoint;
pub(crate) mod poller;

pub use self::core::{Completion, Pump};
pub use driver::{Driver, Phase, ReadStatus, WriteStatus};
pub use endpoint::Endpoint;
