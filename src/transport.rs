//! The single full-duplex exchange with the ADC and its timing.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use tracing::{debug, info, warn};

use crate::buffer::{TransferBuffer, WORD_BYTES};
use crate::config::LinkConfig;
#[cfg(target_os = "linux")]
use crate::config::SpiMode;
use crate::error::{Adc128Error, Result};

/// default `bufsiz` of the spidev driver; longer transfers need the module parameter raised
pub const SPIDEV_DEFAULT_BUFSIZ: usize = 4096;

/// A link able to clock `tx` out while filling `rx` of the same length.
///
/// The exchange either moves every byte or fails; there is no partial result.
pub trait Transport {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()> {
        (**self).transfer(tx, rx)
    }
}

/// Monotonic timestamps bracketing one transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransactionTiming {
    pub start: Instant,
    pub end: Instant,
}

impl TransactionTiming {
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn throughput(&self, bytes: usize) -> Throughput {
        Throughput::new(bytes, self.elapsed())
    }
}

/// Effective rate of a finished transfer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Throughput {
    bits_per_sec: f64,
}

impl Throughput {
    pub fn new(bytes: usize, elapsed: Duration) -> Self {
        // clamp so a transfer faster than the clock resolution stays finite
        let seconds = elapsed.max(Duration::from_nanos(1)).as_secs_f64();
        Throughput {
            bits_per_sec: (bytes * 8) as f64 / seconds,
        }
    }

    pub fn bits_per_sec(&self) -> f64 {
        self.bits_per_sec
    }

    pub fn kbits_per_sec(&self) -> f64 {
        self.bits_per_sec / 1024.0
    }

    /// Response words per second, across all channels.
    pub fn samples_per_sec(&self) -> f64 {
        self.bits_per_sec / (WORD_BYTES * 8) as f64
    }

    pub fn samples_per_sec_per_channel(&self, channels: usize) -> f64 {
        self.samples_per_sec() / channels.max(1) as f64
    }
}

/// Run the one transfer of `buffers`, filling its receive half.
///
/// No retry is attempted: a failed exchange aborts the acquisition.
pub fn execute<T: Transport + ?Sized>(
    link: &mut T,
    buffers: &mut TransferBuffer,
) -> Result<TransactionTiming> {
    let len = buffers.len();
    if len > SPIDEV_DEFAULT_BUFSIZ {
        warn!(
            len,
            limit = SPIDEV_DEFAULT_BUFSIZ,
            "transfer exceeds the default spidev buffer size, the kernel may reject it"
        );
    }
    info!(
        "Starting SPI transfer block of {} bytes ({} channels, {} samples)",
        len,
        buffers.channels(),
        buffers.samples()
    );

    let (tx, rx) = buffers.split_mut();
    let start = Instant::now();
    link.transfer(tx, rx)
        .map_err(Adc128Error::transport("can't send spi message"))?;
    let end = Instant::now();

    let timing = TransactionTiming { start, end };
    debug!(elapsed = ?timing.elapsed(), "transfer complete");
    Ok(timing)
}

/// spidev-backed link to the ADC.
pub struct SpiLink {
    #[cfg(target_os = "linux")]
    spi: Spidev,
}

impl SpiLink {
    /// Open `path` and apply speed, mode and word size.
    #[cfg(target_os = "linux")]
    pub fn open(path: &Path, link: &LinkConfig) -> Result<SpiLink> {
        let mode = match link.mode() {
            SpiMode::Mode0 => SpiModeFlags::SPI_MODE_0,
            SpiMode::Mode1 => SpiModeFlags::SPI_MODE_1,
            SpiMode::Mode2 => SpiModeFlags::SPI_MODE_2,
            SpiMode::Mode3 => SpiModeFlags::SPI_MODE_3,
        };
        let options = SpidevOptions::new()
            .max_speed_hz(link.speed_hz())
            .bits_per_word(link.bits_per_word())
            .mode(mode)
            .lsb_first(false)
            .build();

        let mut spi = Spidev::open(path).map_err(Adc128Error::transport("can't open device"))?;
        spi.configure(&options)
            .map_err(Adc128Error::transport("can't configure spi device"))?;
        debug!(device = %path.display(), ?link, "spi device configured");

        Ok(SpiLink { spi })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open(_path: &Path, _link: &LinkConfig) -> Result<SpiLink> {
        Err(Adc128Error::Transport {
            context: "unsupported os",
            source: io::ErrorKind::Unsupported.into(),
        })
    }
}

impl Transport for SpiLink {
    #[cfg(target_os = "linux")]
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()> {
        let mut transfer = SpidevTransfer::read_write(tx, rx);
        self.spi.transfer(&mut transfer)
    }

    #[cfg(not(target_os = "linux"))]
    fn transfer(&mut self, _tx: &[u8], _rx: &mut [u8]) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelSequence;
    use crate::config::SampleCount;

    struct Echo {
        calls: usize,
    }

    impl Transport for Echo {
        fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()> {
            self.calls += 1;
            rx.copy_from_slice(tx);
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn transfer(&mut self, _tx: &[u8], _rx: &mut [u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "nak"))
        }
    }

    fn buffers() -> TransferBuffer {
        let sequence: ChannelSequence = "0123".parse().unwrap();
        TransferBuffer::build(&sequence, SampleCount::try_from(4).unwrap()).unwrap()
    }

    #[test]
    fn executes_exactly_once() {
        let mut link = Echo { calls: 0 };
        let mut buffers = buffers();
        let timing = execute(&mut link, &mut buffers).unwrap();
        assert_eq!(link.calls, 1);
        assert_eq!(buffers.rx(), buffers.tx());
        assert!(timing.end >= timing.start);
    }

    #[test]
    fn failure_is_a_transport_error() {
        let mut buffers = buffers();
        match execute(&mut Broken, &mut buffers) {
            Err(Adc128Error::Transport { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn throughput_from_elapsed_time() {
        let throughput = Throughput::new(256_000, Duration::from_secs(2));
        assert_eq!(throughput.bits_per_sec(), 1_024_000.0);
        assert_eq!(throughput.kbits_per_sec(), 1000.0);
        assert_eq!(throughput.samples_per_sec(), 64_000.0);
        assert_eq!(throughput.samples_per_sec_per_channel(4), 16_000.0);
    }

    #[test]
    fn throughput_stays_finite_for_zero_elapsed() {
        assert!(Throughput::new(10, Duration::ZERO).bits_per_sec().is_finite());
    }
}
