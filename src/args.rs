use clap::Parser;
use std::path::PathBuf;

use adc128::buffer::transfer_len;
use adc128::config::{DEFAULT_CHANNELS, DEFAULT_DEVICE, DEFAULT_SPEED_HZ};
use adc128::ChannelSequence;
use adc128::{ConfigError, LinkConfig, RunConfig, SampleCount, SpiMode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Reads blocks of samples from an ADC128S052 using the spidev API
pub(crate) struct Args {
    /// SPI device to use
    #[arg(short = 'D', long, default_value = DEFAULT_DEVICE)]
    pub(crate) device: PathBuf,
    /// Max SPI clock speed (Hz)
    #[arg(short, long, default_value_t = DEFAULT_SPEED_HZ)]
    pub(crate) speed: u32,
    /// SPI mode (0-3)
    #[arg(short, long, default_value_t = 0)]
    pub(crate) mode: u8,
    /// Write the raw samples to a file (e.g. "results.bin")
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,
    /// List of ADC channels (e.g. "012345" means channels 0 to 5)
    #[arg(short = 'C', long, default_value = DEFAULT_CHANNELS)]
    pub(crate) channels: String,
    /// Number of times the channel list is sampled
    #[arg(short = 'S', long, default_value_t = 1, allow_negative_numbers = true)]
    pub(crate) samples: i64,
    /// Print all log messages and debug information
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Args {
    pub(crate) fn to_config(&self) -> Result<RunConfig, ConfigError> {
        let link = LinkConfig::new(self.speed, SpiMode::try_from(self.mode)?)?;
        let channels: ChannelSequence = self.channels.parse()?;
        let samples = SampleCount::try_from(self.samples)?;
        // reject before the device is opened
        transfer_len(channels.len(), samples.get())?;

        let config = RunConfig::new(&self.device, link, channels, samples);
        Ok(match &self.output {
            Some(path) => config.with_output(path),
            None => config,
        })
    }
}
