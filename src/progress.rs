//! Progress line on a terminal.
//!
//! The pump calls a [`Progress`] implementation when the loop starts, about
//! once per second after that and once more on exit. [`ProgressLine`] renders the same carriage-return
//! terminated line each time so it overwrites itself:
//!
//! ```text
//! Read:        1048576, Buffer:          65536   6% (1), Reads:             16, Writes:             15
//! Read: 1.00M, Buffer: 64.0k   6% (1), Reads:             16, Writes:             15
//! ```

use crate::stats::Stats;

use log::warn;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Receives periodic snapshots from the pump.
pub trait Progress {
    fn report(&mut self, stats: &Stats);
}

pub struct ProgressLine<W: Write> {
    out: W,
    human_readable: bool,
}

impl ProgressLine<io::Stderr> {
    pub fn stderr(human_readable: bool) -> Self {
        Self::new(io::stderr(), human_readable)
    }
}

impl<W: Write> ProgressLine<W> {
    pub fn new(out: W, human_readable: bool) -> Self {
        Self {
            out,
            human_readable,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Progress for ProgressLine<W> {
    fn report(&mut self, stats: &Stats) {
        let line = render(stats, self.human_readable);
        let written = self
            .out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.flush());

        if let Err(error) = written {
            warn!("could not write progress line: {error}");
        }
    }
}

/// Formats one progress line, including the leading carriage return.
pub fn render(stats: &Stats, human_readable: bool) -> String {
    let percent = stats.percent_full();

    if human_readable {
        format!(
            "\rRead: {}, Buffer: {} {:3}% ({}), Reads: {:14}, Writes: {:14}",
            humanise(stats.bytes_read),
            humanise(stats.buffered as u64),
            percent,
            stats.depth,
            stats.reads,
            stats.writes,
        )
    } else {
        format!(
            "\rRead: {:14}, Buffer: {:14} {:3}% ({}), Reads: {:14}, Writes: {:14}",
            stats.bytes_read, stats.buffered, percent, stats.depth, stats.reads, stats.writes,
        )
    }
}

const SUFFIXES: [&str; 6] = ["k", "M", "G", "T", "P", "E"];

/// Five-column size using powers of 1024.
///
/// Values below 1024 are right-aligned integers. Larger values keep four
/// significant digits and a suffix: `1.50k`, `12.5M`, ` 123G`, `1000k`.
pub fn humanise(value: u64) -> String {
    if value < 1024 {
        return format!("{value:5}");
    }

    let mut scaled = value as f64;
    let mut suffix = SUFFIXES[SUFFIXES.len() - 1];
    for candidate in SUFFIXES {
        scaled /= 1024.0;
        if scaled < 1024.0 {
            suffix = candidate;
            break;
        }
    }

    let integer_digits = match scaled {
        s if s >= 1000.0 => 4,
        s if s >= 100.0 => 3,
        s if s >= 10.0 => 2,
        _ => 1,
    };
    let decimals = 4 - integer_digits;
    let formatted = format!("{scaled:.decimals$}");

    let digits: String = formatted.chars().take(4).collect();
    match digits.strip_suffix('.') {
        Some(whole) => format!(" {whole}{suffix}"),
        None => format!("{digits}{suffix}"),
    }
}

/// One-second cadence for progress reports. The first report is due
/// immediately.
#[derive(Debug)]
pub(crate) struct Ticker {
    interval: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Time left before the next report is due.
    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Whether a report is due, restarting the interval when it is. A wait
    /// that timed out is always due.
    pub(crate) fn due(&mut self, now: Instant, timed_out: bool) -> bool {
        if timed_out || self.remaining(now).is_zero() {
            self.last = Some(now);
            return true;
        }

        false
    }
}
