//! Run configuration and size parsing.

use crate::error::{Error, Result};

/// Default number of bytes requested by one read.
pub const DEFAULT_READ_UNIT: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of bytes held in memory.
    pub ceiling: usize,
    /// Maximum number of bytes requested by one read.
    pub read_unit: usize,
    /// Print a progress line on stderr.
    pub progress: bool,
    /// Use 1024-based suffixes in the progress line.
    pub human_readable: bool,
}

impl Config {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling,
            read_unit: DEFAULT_READ_UNIT,
            progress: false,
            human_readable: false,
        }
    }

    /// Checks the values that must hold before any I/O starts.
    pub fn validate(&self) -> Result<()> {
        if self.ceiling == 0 {
            return Err(Error::MissingCeiling);
        }

        if self.read_unit == 0 {
            return Err(Error::ZeroReadUnit);
        }

        Ok(())
    }
}

/// Parses a byte count such as `4096`, `0x1000`, `64k` or `2G`.
///
/// The number may be decimal, hexadecimal with a `0x` prefix or octal with a
/// leading `0`, so `08` is rejected. An optional suffix `k`, `M`, `G` or `T` multiplies it by the
/// matching power of 1024. `what` names the value in the error.
pub fn parse_size(input: &str, what: &'static str) -> Result<usize> {
    let invalid = || Error::InvalidSize {
        what,
        value: input.to_string(),
    };

    let (radix, body) = match input {
        s if s.starts_with("0x") || s.starts_with("0X") => (16, &s[2..]),
        s if s.starts_with('0') => (8, s),
        s => (10, s),
    };

    let split = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    let (digits, suffix) = body.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }

    let value = u64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    let shift = match suffix {
        "" => 0,
        "k" => 10,
        "M" => 20,
        "G" => 30,
        "T" => 40,
        _ => return Err(invalid()),
    };

    let scaled = value.checked_mul(1u64 << shift).ok_or_else(invalid)?;
    usize::try_from(scaled).map_err(|_| invalid())
}
