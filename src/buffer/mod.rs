//! Bounded elastic storage between the input and output endpoints.
//!
//! - [`Chunk`]: the bytes returned by one read call plus a written offset
//! - [`BufferQueue`]: FIFO of chunks with an O(1) occupancy counter
//! - [`Maintenance`]: reclamation hook run after every append, with the
//!   default [`DepthShrink`] policy

pub mod chunk;
pub mod maintenance;
pub mod queue;

pub use chunk::Chunk;
pub use maintenance::{Chunks, DepthShrink, Maintenance, NoMaintenance};
pub use queue::BufferQueue;
