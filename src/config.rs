//! Run configuration, built once from user input and passed to every stage.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::channels::ChannelSequence;
use crate::error::ConfigError;

pub const DEFAULT_DEVICE: &str = "/dev/spidev1.1";
pub const DEFAULT_SPEED_HZ: u32 = 400_000;
pub const DEFAULT_CHANNELS: &str = "01234567";

/// The link is driven in bytes; control and response words are two of them.
pub const BITS_PER_WORD: u8 = 8;

/// Clock polarity / phase combination of the link
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SpiMode {
    #[default]
    Mode0 = 0,
    Mode1,
    Mode2,
    Mode3,
}

impl TryFrom<u8> for SpiMode {
    type Error = ConfigError;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(SpiMode::Mode0),
            1 => Ok(SpiMode::Mode1),
            2 => Ok(SpiMode::Mode2),
            3 => Ok(SpiMode::Mode3),
            _ => Err(ConfigError::InvalidMode(mode)),
        }
    }
}

/// Settings applied to the device when the link is opened.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    speed_hz: u32,
    mode: SpiMode,
}

impl LinkConfig {
    pub fn new(speed_hz: u32, mode: SpiMode) -> Result<Self, ConfigError> {
        if speed_hz == 0 {
            return Err(ConfigError::InvalidSpeed);
        }
        Ok(LinkConfig { speed_hz, mode })
    }

    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    pub fn mode(&self) -> SpiMode {
        self.mode
    }

    pub fn bits_per_word(&self) -> u8 {
        BITS_PER_WORD
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            speed_hz: DEFAULT_SPEED_HZ,
            mode: SpiMode::default(),
        }
    }
}

/// Number of times the channel sequence is repeated within one transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleCount(NonZeroUsize);

impl SampleCount {
    pub const ONE: SampleCount = SampleCount(NonZeroUsize::MIN);

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for SampleCount {
    type Error = ConfigError;

    fn try_from(samples: i64) -> Result<Self, Self::Error> {
        usize::try_from(samples)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(SampleCount)
            .ok_or(ConfigError::InvalidSampleCount(samples))
    }
}

/// Everything a single acquisition needs. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    device: PathBuf,
    link: LinkConfig,
    channels: ChannelSequence,
    samples: SampleCount,
    output: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(
        device: impl Into<PathBuf>,
        link: LinkConfig,
        channels: ChannelSequence,
        samples: SampleCount,
    ) -> Self {
        RunConfig {
            device: device.into(),
            link,
            channels,
            samples,
            output: None,
        }
    }

    /// Persist the raw samples to `path` after the transfer.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn link(&self) -> &LinkConfig {
        &self.link
    }

    pub fn channels(&self) -> &ChannelSequence {
        &self.channels
    }

    pub fn samples(&self) -> SampleCount {
        self.samples
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}
