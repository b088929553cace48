//! Transmit / receive buffers for one batched transfer.
//!
//! pattern of a transfer with sequence `"01"` and two samples:
//!
//! ```text
//!   tx: c0 c1 c0 c1 --
//!   rx: -- r0 r1 r0 r1
//! ```
//!
//! The ADC answers a control word in the slot after the one carrying it. The
//! transfer is therefore one word longer than the requested samples, the
//! first response word is dropped and the last control word is a dummy.

use crate::channels::ChannelSequence;
use crate::config::SampleCount;
use crate::error::ConfigError;

/// number of bytes in a control word and in a response word
pub const WORD_BYTES: usize = 2;

/// number of leading response bytes answering no requested channel
pub const PIPELINE_DELAY_BYTES: usize = WORD_BYTES;

/// largest transfer a single spidev message can describe (`spi_ioc_transfer.len` is 32 bits)
pub const MAX_TRANSFER_LEN: usize = u32::MAX as usize;

/// Total number of bytes exchanged for `channels` channels sampled `samples` times.
pub fn transfer_len(channels: usize, samples: usize) -> Result<usize, ConfigError> {
    WORD_BYTES
        .checked_mul(channels)
        .and_then(|len| len.checked_mul(samples))
        .and_then(|len| len.checked_add(PIPELINE_DELAY_BYTES))
        .filter(|&len| len <= MAX_TRANSFER_LEN)
        .ok_or(ConfigError::TransferTooLarge { channels, samples })
}

/// Owned transmit and receive buffers of equal length.
#[derive(Debug)]
pub struct TransferBuffer {
    tx: Vec<u8>,
    rx: Vec<u8>,
    channels: usize,
    samples: usize,
}

impl TransferBuffer {
    /// Encode `samples` repetitions of the sequence into a zeroed transmit buffer.
    pub fn build(sequence: &ChannelSequence, samples: SampleCount) -> Result<Self, ConfigError> {
        let channels = sequence.len();
        let samples = samples.get();
        let len = transfer_len(channels, samples)?;

        let mut tx = vec![0u8; len];
        let words = tx[..len - PIPELINE_DELAY_BYTES].chunks_exact_mut(WORD_BYTES);
        for (slot, channel) in words.zip(sequence.iter().cycle()) {
            slot.copy_from_slice(&channel.control_word().to_ne_bytes());
        }

        Ok(TransferBuffer {
            tx,
            rx: vec![0u8; len],
            channels,
            samples,
        })
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Always false; even a single sample carries the pipeline word.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    pub fn rx(&self) -> &[u8] {
        &self.rx
    }

    /// Borrow both halves for the exchange.
    pub fn split_mut(&mut self) -> (&[u8], &mut [u8]) {
        (&self.tx, &mut self.rx)
    }

    /// Received bytes with the pipeline word removed.
    pub fn payload(&self) -> &[u8] {
        &self.rx[PIPELINE_DELAY_BYTES..]
    }

    pub fn matrix(&self) -> SampleMatrix<'_> {
        SampleMatrix {
            words: self.payload(),
            channels: self.channels,
            samples: self.samples,
        }
    }
}

/// Big-endian response words viewed as `samples` rows of `channels` columns.
#[derive(Debug, Clone, Copy)]
pub struct SampleMatrix<'a> {
    words: &'a [u8],
    channels: usize,
    samples: usize,
}

impl<'a> SampleMatrix<'a> {
    /// View a raw receive buffer, or `None` when it is too short for the shape.
    pub fn from_response(rx: &'a [u8], channels: usize, samples: usize) -> Option<Self> {
        match transfer_len(channels, samples) {
            Ok(len) if rx.len() >= len => {}
            _ => return None,
        }
        Some(SampleMatrix {
            words: &rx[PIPELINE_DELAY_BYTES..],
            channels,
            samples,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Value at `position` within the sequence for repetition `sample`.
    pub fn get(&self, sample: usize, position: usize) -> Option<u16> {
        if sample >= self.samples || position >= self.channels {
            return None;
        }
        let offset = (sample * self.channels + position) * WORD_BYTES;
        self.words
            .get(offset..offset + WORD_BYTES)
            .map(|word| u16::from_be_bytes([word[0], word[1]]))
    }

    /// All values, repetition by repetition, in sequence order.
    pub fn values(&self) -> impl Iterator<Item = u16> + 'a {
        self.words
            .chunks_exact(WORD_BYTES)
            .take(self.channels * self.samples)
            .map(|word| u16::from_be_bytes([word[0], word[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: i64) -> SampleCount {
        SampleCount::try_from(n).unwrap()
    }

    #[test]
    fn length_covers_pipeline_word() {
        for (spec, n) in [("0", 1), ("01", 2), ("01234567", 100), ("3333", 7)] {
            let sequence: ChannelSequence = spec.parse().unwrap();
            let buffers = TransferBuffer::build(&sequence, samples(n)).unwrap();
            let expected = 2 * spec.len() * n as usize + 2;
            assert_eq!(buffers.len(), expected);
            assert_eq!(buffers.rx().len(), buffers.tx().len());
            assert_eq!(buffers.len() % 2, 0);
        }
    }

    #[test]
    fn two_channels_two_samples() {
        let sequence: ChannelSequence = "01".parse().unwrap();
        let buffers = TransferBuffer::build(&sequence, samples(2)).unwrap();
        assert_eq!(buffers.len(), 10);

        let words: Vec<u16> = buffers
            .tx()
            .chunks_exact(2)
            .map(|w| u16::from_ne_bytes([w[0], w[1]]))
            .collect();
        assert_eq!(words, vec![0x00, 0x08, 0x00, 0x08, 0x00]);
        assert!(buffers.rx().iter().all(|&b| b == 0));
    }

    #[test]
    fn control_words_follow_sequence_order() {
        let sequence: ChannelSequence = "750".parse().unwrap();
        let buffers = TransferBuffer::build(&sequence, samples(3)).unwrap();
        let words: Vec<u16> = buffers
            .tx()
            .chunks_exact(2)
            .map(|w| u16::from_ne_bytes([w[0], w[1]]) >> 3)
            .collect();
        assert_eq!(words, vec![7, 5, 0, 7, 5, 0, 7, 5, 0, 0]);
    }

    #[test]
    fn matrix_skips_first_word() {
        let rx = [0xff, 0xff, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xaa, 0xbb];
        let matrix = SampleMatrix::from_response(&rx, 2, 2).unwrap();
        assert_eq!(matrix.get(0, 0), Some(0x0102));
        assert_eq!(matrix.get(0, 1), Some(0x0304));
        assert_eq!(matrix.get(1, 0), Some(0x0506));
        assert_eq!(matrix.get(1, 1), Some(0x0708));
        assert_eq!(matrix.get(2, 0), None);
        assert_eq!(matrix.get(0, 2), None);
        assert_eq!(matrix.values().collect::<Vec<_>>(), vec![0x0102, 0x0304, 0x0506, 0x0708]);
    }

    #[test]
    fn oversized_transfer_is_a_config_error() {
        let sequence: ChannelSequence = "01234567".parse().unwrap();
        match TransferBuffer::build(&sequence, samples(i64::MAX)) {
            Err(ConfigError::TransferTooLarge { channels, samples }) => {
                assert_eq!(channels, 8);
                assert_eq!(samples, i64::MAX as usize);
            }
            other => panic!("unexpected {:?}", other),
        }

        // one sample past the 32-bit spidev length
        let limit = (MAX_TRANSFER_LEN - PIPELINE_DELAY_BYTES) / WORD_BYTES;
        assert_eq!(transfer_len(1, limit), Ok(MAX_TRANSFER_LEN - 1));
        assert!(transfer_len(1, limit + 1).is_err());
        assert!(transfer_len(usize::MAX, 2).is_err());
    }

    #[test]
    fn matrix_rejects_short_response() {
        assert!(SampleMatrix::from_response(&[0; 9], 2, 2).is_none());
        assert!(SampleMatrix::from_response(&[0; 4], 1, 1).is_some());
        assert!(SampleMatrix::from_response(&[0; 4], usize::MAX, 2).is_none());
    }

    #[test]
    fn payload_drops_exactly_two_bytes() {
        for (spec, n) in [("0", 1), ("0123", 9)] {
            let sequence: ChannelSequence = spec.parse().unwrap();
            let buffers = TransferBuffer::build(&sequence, samples(n)).unwrap();
            assert_eq!(buffers.payload().len(), buffers.len() - 2);
        }
    }
}
