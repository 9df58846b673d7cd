use crate::config::{Config, parse_size};
use crate::error::Result;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "pbuffer", version)]
#[command(
    about = "Copy STDIN to STDOUT, storing up to a fixed number of bytes.",
    long_about = "Copy STDIN to STDOUT, storing up to a fixed number of bytes.\n\
                  In the event of a read error or end of input, this will wait until\n\
                  all stored bytes have been output before exiting.\n\
                  No attempt is made to line-buffer or coalesce the input."
)]
pub struct Cli {
    /// Maximum amount of data to store. Accepts suffixes: k, M, G, T, for powers of 1024.
    #[arg(short = 'm', long = "max-queue", value_name = "BYTES", value_parser = max_queue)]
    pub max_queue: usize,

    /// Maximum amount of data to read in one go. Accepts suffixes: k, M, G, T.
    #[arg(
        short = 'r',
        long = "read-size",
        value_name = "BYTES",
        default_value = "64k",
        value_parser = read_size
    )]
    pub read_size: usize,

    /// Show a progress line on STDERR.
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Show progress sizes in human-readable format (e.g. 1k, 23M).
    #[arg(short = 's', long = "human-readable")]
    pub human_readable: bool,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            ceiling: self.max_queue,
            read_unit: self.read_size,
            progress: self.progress,
            human_readable: self.human_readable,
        }
    }
}

fn max_queue(value: &str) -> Result<usize> {
    parse_size(value, "max queue length")
}

fn read_size(value: &str) -> Result<usize> {
    parse_size(value, "read size")
}
