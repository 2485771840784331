use std::time::Duration;

use crate::color::Color;
use crate::error::ConfigError;

pub const DEFAULT_PARALLELISM: usize = 128;
pub const DEFAULT_UP_COLOR: Color = Color::new(0x32, 0xc8, 0x32);
pub const DEFAULT_DOWN_COLOR: Color = Color::new(0x32, 0x32, 0x32);

/// Settings for one liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Echo requests sent per host.
    pub count: u16,
    /// Pause between two echo requests.
    pub interval: Duration,
    /// Hard limit for the whole probe, replies arriving later are ignored.
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: 4,
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Maximum number of probes in flight.
    pub parallelism: usize,
    /// Capacity of the queue between probes and the writer.
    pub queue_depth: usize,
    pub probe: ProbeConfig,
}

impl SweepConfig {
    pub fn new(parallelism: usize) -> Result<Self, ConfigError> {
        if parallelism == 0 {
            return Err(ConfigError::InvalidParallelism);
        }
        Ok(Self {
            parallelism,
            queue_depth: parallelism.saturating_mul(2),
            probe: ProbeConfig::default(),
        })
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth.max(1);
        self
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            queue_depth: DEFAULT_PARALLELISM * 2,
            probe: ProbeConfig::default(),
        }
    }
}

/// Colors used when painting a canvas.
///
/// Without an `unscanned` color the canvas starts in the `down` color, so hosts that were
/// probed and found down cannot be told apart from addresses that were never probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub up: Color,
    pub down: Color,
    pub unscanned: Option<Color>,
}

impl Palette {
    pub fn background(&self) -> Color {
        self.unscanned.unwrap_or(self.down)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            up: DEFAULT_UP_COLOR,
            down: DEFAULT_DOWN_COLOR,
            unscanned: None,
        }
    }
}
