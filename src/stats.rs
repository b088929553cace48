//! Per-channel reduction of a decoded sample matrix.

use std::collections::BTreeMap;

use crate::buffer::SampleMatrix;
use crate::channels::ChannelSequence;

/// Running min / max / sum of one channel bucket.
///
/// Raw 16-bit words are accumulated as received; no masking to the 12-bit
/// conversion result is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub min: u16,
    pub max: u16,
    pub sum: u64,
    pub count: usize,
}

impl Default for ChannelStats {
    fn default() -> Self {
        ChannelStats {
            min: u16::MAX,
            max: 0,
            sum: 0,
            count: 0,
        }
    }
}

impl ChannelStats {
    #[inline]
    pub fn record(&mut self, value: u16) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += u64::from(value);
        self.count += 1;
    }

    /// Truncating mean over every recorded value, `0` before anything has been recorded.
    ///
    /// The divisor is `count`, not the sample count: a channel listed twice in
    /// the sequence contributes two values per repetition.
    pub fn average(&self) -> u64 {
        match self.count {
            0 => 0,
            count => self.sum / count as u64,
        }
    }

    pub fn delta_min(&self) -> u64 {
        self.average().saturating_sub(u64::from(self.min))
    }

    pub fn delta_max(&self) -> u64 {
        u64::from(self.max).saturating_sub(self.average())
    }
}

/// Statistics keyed by channel bucket, remembering first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStatistics {
    buckets: BTreeMap<u8, ChannelStats>,
    order: Vec<u8>,
}

impl ChannelStatistics {
    pub fn get(&self, bucket: u8) -> Option<&ChannelStats> {
        self.buckets.get(&bucket)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Buckets in the order their channel first appears in the sequence.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ChannelStats)> + '_ {
        self.order
            .iter()
            .filter_map(move |bucket| self.buckets.get(bucket).map(|stats| (*bucket, stats)))
    }

    fn record(&mut self, bucket: u8, value: u16) {
        self.buckets.entry(bucket).or_default().record(value);
    }
}

/// Attribute every value of `matrix` to its channel and reduce per bucket.
///
/// Values are visited repetition by repetition in sequence order, the same
/// nesting used when the control words were encoded.
pub fn aggregate(sequence: &ChannelSequence, matrix: &SampleMatrix) -> ChannelStatistics {
    debug_assert_eq!(sequence.len(), matrix.channels());

    let mut statistics = ChannelStatistics {
        buckets: BTreeMap::new(),
        order: sequence.buckets(),
    };
    for (value, channel) in matrix.values().zip(sequence.iter().cycle()) {
        statistics.record(channel.bucket(), value);
    }
    statistics
}
