/// Monotonic totals maintained by the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Bytes accepted from the input.
    pub bytes_read: u64,
    /// Read calls that returned data.
    pub reads: u64,
    /// Write calls that accepted data, partial ones included.
    pub writes: u64,
}

/// Point-in-time view handed to progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub bytes_read: u64,
    pub buffered: usize,
    pub ceiling: usize,
    /// Number of queued chunks.
    pub depth: usize,
    pub reads: u64,
    pub writes: u64,
}

impl Stats {
    /// Occupancy as a whole percentage of the ceiling.
    pub fn percent_full(&self) -> u64 {
        if self.ceiling == 0 {
            return 0;
        }

        (self.buffered as u128 * 100 / self.ceiling as u128) as u64
    }
}
