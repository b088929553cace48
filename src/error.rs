use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejected user input. Raised before the device is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("channel specification is empty")]
    EmptyChannelSpec,
    #[error("invalid channel specification {spec:?}: {found:?} is not a digit")]
    InvalidChannel { spec: String, found: char },
    #[error("channel index {0} is out of range")]
    ChannelOutOfRange(u8),
    #[error("sample count must be positive, got {0}")]
    InvalidSampleCount(i64),
    #[error("{samples} samples of {channels} channels do not fit in one spi transfer")]
    TransferTooLarge { channels: usize, samples: usize },
    #[error("spi speed must be greater than zero")]
    InvalidSpeed,
    #[error("invalid spi mode {0} (expected 0..=3)")]
    InvalidMode(u8),
}

#[derive(Debug, Error)]
pub enum Adc128Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Opening, configuring or exchanging data with the device failed.
    #[error("{context}")]
    Transport {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Adc128Error {
    pub(crate) fn transport(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Adc128Error::Transport { context, source }
    }
}

pub type Result<T, E = Adc128Error> = std::result::Result<T, E>;
