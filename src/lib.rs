//! `adc128` reads blocks of samples from an ADC128S052 8-channel, 12-bit A/D converter
//! through the Linux spidev API.
//!
//! A channel list is sampled a number of times within a single SPI transfer. The
//! converter answers every control word one word later, so the transfer carries one
//! extra word and the first two received bytes are discarded before decoding.
//!
//! # Example
//!
//! ```no_run
//! use adc128::{acquire, LinkConfig, RunConfig, SampleCount, SpiLink};
//!
//! let config = RunConfig::new(
//!     "/dev/spidev1.1",
//!     LinkConfig::default(),
//!     "0123".parse()?,
//!     SampleCount::try_from(100)?,
//! );
//! let mut link = SpiLink::open(config.device(), config.link())?;
//! let acquisition = acquire(&config, &mut link)?;
//! for (channel, stats) in acquisition.statistics.iter() {
//!     println!("ch{}: {}", channel, stats.average());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::debug;

pub mod buffer;
pub mod channels;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod stats;
pub mod transport;

pub use buffer::{SampleMatrix, TransferBuffer};
pub use channels::{Channel, ChannelSequence};
pub use config::{LinkConfig, RunConfig, SampleCount, SpiMode};
pub use error::{Adc128Error, ConfigError, Result};
pub use report::Report;
pub use stats::{ChannelStatistics, ChannelStats};
pub use transport::{SpiLink, TransactionTiming, Throughput, Transport};

/// Outcome of one batched transfer.
#[derive(Debug)]
pub struct Acquisition {
    pub buffers: TransferBuffer,
    pub timing: TransactionTiming,
    pub statistics: ChannelStatistics,
}

/// Sample `config.channels()` `config.samples()` times over `link` and reduce the result.
///
/// The raw payload is written to `config.output()` when one is set, after the
/// statistics have been computed. Any failure aborts the run; nothing is
/// written if the transfer fails.
pub fn acquire<T: Transport + ?Sized>(config: &RunConfig, link: &mut T) -> Result<Acquisition> {
    let mut buffers = TransferBuffer::build(config.channels(), config.samples())?;
    debug!(len = buffers.len(), channels = %config.channels(), "transfer buffers built");

    let timing = transport::execute(link, &mut buffers)?;
    let statistics = stats::aggregate(config.channels(), &buffers.matrix());

    if let Some(path) = config.output() {
        output::write_payload(path, buffers.payload())?;
    }

    Ok(Acquisition {
        buffers,
        timing,
        statistics,
    })
}
