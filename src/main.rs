mod args;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, Level};

use adc128::{acquire, Report, SpiLink};
use args::*;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();
    debug!(?args, "Logging started");

    let config = args.to_config().context("invalid configuration")?;
    let mut link = SpiLink::open(config.device(), config.link())
        .with_context(|| format!("can't use {}", config.device().display()))?;

    let acquisition = acquire(&config, &mut link)?;
    print!("{}", Report::new(&config, &acquisition));

    if let Some(path) = config.output() {
        println!("Data written to file: {}", path.display());
    }
    Ok(())
}
