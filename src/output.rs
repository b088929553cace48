//! Raw sample dump.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Adc128Error, Result};

/// Write `payload` verbatim to `path`, truncating any existing file.
///
/// The payload is the receive buffer without the pipeline word: big-endian
/// 16-bit samples, repetition by repetition, in channel sequence order.
pub fn write_payload(path: &Path, payload: &[u8]) -> Result<()> {
    let io_error = |source| Adc128Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    writer.write_all(payload).map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    debug!(path = %path.display(), bytes = payload.len(), "payload written");
    Ok(())
}
