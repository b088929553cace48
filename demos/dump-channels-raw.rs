#![deny(clippy::all)]

use adc128::{acquire, Channel, ChannelSequence, LinkConfig, RunConfig, SampleCount, SpiLink};

/// outputs one raw adc value for every input channel
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::new(
        "/dev/spidev1.1",
        LinkConfig::default(),
        ChannelSequence::new(Channel::INPUTS.to_vec())?,
        SampleCount::ONE,
    );
    let mut link = SpiLink::open(config.device(), config.link())?;
    let acquisition = acquire(&config, &mut link)?;

    for (channel, stats) in acquisition.statistics.iter() {
        println!("channel #{}: {}", channel, stats.min);
    }
    Ok(())
}
