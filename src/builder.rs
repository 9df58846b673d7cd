use crate::buffer::{BufferQueue, DepthShrink, Maintenance};
use crate::config::{Config, DEFAULT_READ_UNIT};
use crate::error::{Error, Result};
use crate::progress::{Progress, ProgressLine, Ticker};
use crate::reactor::{Driver, Pump};

use std::time::Duration;

/// Configures and creates a [`Pump`].
///
/// # Example
///
/// ```no_run
/// use pbuffer::{Endpoint, PumpBuilder, Shutdown};
///
/// # fn main() -> pbuffer::Result<()> {
/// let mut pump = PumpBuilder::new(16 * 1024 * 1024).read_unit(4096).build()?;
/// let shutdown = Shutdown::new()?;
/// let (mut input, mut output) = (Endpoint::stdin(), Endpoint::stdout());
/// pump.run(&mut input, &mut output, &shutdown)?;
/// # Ok(())
/// # }
/// ```
pub struct PumpBuilder {
    ceiling: usize,
    read_unit: usize,
    progress: Option<Box<dyn Progress>>,
    tick: Duration,
}

impl PumpBuilder {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling,
            read_unit: DEFAULT_READ_UNIT,
            progress: None,
            tick: Duration::from_secs(1),
        }
    }

    /// Builder for `config`, reporting progress on stderr when enabled.
    pub fn from_config(config: &Config) -> Self {
        let builder = Self::new(config.ceiling).read_unit(config.read_unit);

        if config.progress {
            builder.progress(ProgressLine::stderr(config.human_readable))
        } else {
            builder
        }
    }

    pub fn read_unit(mut self, read_unit: usize) -> Self {
        self.read_unit = read_unit;
        self
    }

    pub fn progress<P: Progress + 'static>(mut self, progress: P) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Interval between progress reports. Defaults to one second.
    pub fn tick_interval(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Builds a pump with the default [`DepthShrink`] reclamation policy.
    pub fn build(self) -> Result<Pump> {
        let maintenance = DepthShrink::new(self.read_unit);
        self.build_with(maintenance)
    }

    /// Builds a pump whose queue runs `maintenance` after every append.
    pub fn build_with<M: Maintenance>(self, maintenance: M) -> Result<Pump<M>> {
        if self.ceiling == 0 {
            return Err(Error::MissingCeiling);
        }
        if self.read_unit == 0 {
            return Err(Error::ZeroReadUnit);
        }

        let queue = BufferQueue::with_maintenance(maintenance);
        let driver = Driver::with_queue(self.ceiling, self.read_unit, queue);
        let progress = self
            .progress
            .map(|progress| (progress, Ticker::new(self.tick)));

        Ok(Pump::new(driver, progress))
    }
}
