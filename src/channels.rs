//! Channel selection: single channels and the ordered sequence sampled per repetition.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// number of analog inputs of the ADC128S052
pub const HARDWARE_CHANNEL_COUNT: u8 = 8;

/// number of distinct statistic buckets a channel index is folded into
pub const STAT_BUCKETS: u8 = 16;

/// index of the lsb of the channel address field (ADD2..ADD0) within a control word
pub const CHANNEL_ADDRESS_SHIFT: u8 = 3;

/// A channel index as written in a channel specification.
///
/// Indices up to 15 are representable; only `0..8` are wired to inputs on the
/// ADC128S052. Higher indices are still encoded verbatim into the control word.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    /// The eight hardware inputs, to facilitate iteration
    pub const INPUTS: [Channel; HARDWARE_CHANNEL_COUNT as usize] = [
        Channel(0), Channel(1), Channel(2), Channel(3),
        Channel(4), Channel(5), Channel(6), Channel(7),
    ];

    pub fn new(index: u8) -> Result<Self, ConfigError> {
        if index < STAT_BUCKETS {
            Ok(Channel(index))
        } else {
            Err(ConfigError::ChannelOutOfRange(index))
        }
    }

    /// Parse a single decimal digit.
    pub fn from_digit(digit: char) -> Option<Self> {
        digit.to_digit(10).map(|index| Channel(index as u8))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The 16-bit control word selecting this channel for the next conversion.
    #[inline]
    pub fn control_word(self) -> u16 {
        u16::from(self.0) << CHANNEL_ADDRESS_SHIFT
    }

    /// The statistics bucket this channel is accumulated in.
    #[inline]
    pub fn bucket(self) -> u8 {
        self.0 % STAT_BUCKETS
    }

    pub fn is_hardware_input(self) -> bool {
        self.0 < HARDWARE_CHANNEL_COUNT
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered list of channels, sampled once per repetition in wire order.
///
/// Repeated channels are kept: `"001"` samples channel 0 twice per repetition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSequence(Vec<Channel>);

impl ChannelSequence {
    pub fn new(channels: Vec<Channel>) -> Result<Self, ConfigError> {
        if channels.is_empty() {
            return Err(ConfigError::EmptyChannelSpec);
        }
        Ok(ChannelSequence(channels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an empty sequence cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Channel> + Clone + '_ {
        self.0.iter().copied()
    }

    /// Statistic buckets in order of first appearance, without repeats.
    pub fn buckets(&self) -> Vec<u8> {
        let mut seen = Vec::with_capacity(self.0.len());
        for channel in self.iter() {
            if !seen.contains(&channel.bucket()) {
                seen.push(channel.bucket());
            }
        }
        seen
    }
}

impl FromStr for ChannelSequence {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let channels = spec
            .chars()
            .map(|found| {
                Channel::from_digit(found).ok_or_else(|| ConfigError::InvalidChannel {
                    spec: spec.to_owned(),
                    found,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for channel in channels.iter().filter(|c| !c.is_hardware_input()) {
            warn!(%channel, "channel is not an ADC128S052 input, its address bits will be ignored by the device");
        }

        ChannelSequence::new(channels)
    }
}

impl fmt::Display for ChannelSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.iter().try_for_each(|channel| write!(f, "{}", channel))
    }
}
