use std::fmt;

use crate::config::RunConfig;
use crate::Acquisition;

/// Console summary of an acquisition.
pub struct Report<'a> {
    config: &'a RunConfig,
    acquisition: &'a Acquisition,
}

impl<'a> Report<'a> {
    pub fn new(config: &'a RunConfig, acquisition: &'a Acquisition) -> Self {
        Report { config, acquisition }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let speed = self.config.link().speed_hz();
        let buffers = &self.acquisition.buffers;
        let throughput = self.acquisition.timing.throughput(buffers.len());

        writeln!(f, "SPI max speed: {} Hz ({} kHz)", speed, speed / 1000)?;
        writeln!(
            f,
            "Transfer block: {} bytes ({} channels, {} samples)",
            buffers.len(),
            buffers.channels(),
            buffers.samples()
        )?;
        writeln!(
            f,
            "Effective transfer rate: {:.1}kbps ({:.1} Samples/s, {:.1} Samples/s per channel)",
            throughput.kbits_per_sec(),
            throughput.samples_per_sec(),
            throughput.samples_per_sec_per_channel(buffers.channels())
        )?;

        for (bucket, stats) in self.acquisition.statistics.iter() {
            writeln!(
                f,
                "Statistics ch[{}]: (min, avg, max, dmin, dmax) = ({}, {}, {}, {}, {})",
                bucket,
                stats.min,
                stats.average(),
                stats.max,
                stats.delta_min(),
                stats.delta_max()
            )?;
        }
        Ok(())
    }
}
