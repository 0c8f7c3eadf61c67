use std::path::Path;

use crate::models::config::SinkFormat;
use crate::models::error::CaptureError;

/// Destination for recorded samples.
///
/// Call order per recording: `set_format` (once per configuration), then
/// `open`, any number of `write`s, then `close`. The sink owns the
/// on-disk container; a file is only complete after `close` returns.
pub trait AudioSink: Send {
    /// Set the PCM layout of files opened from now on.
    fn set_format(&mut self, format: SinkFormat);

    /// Create `path` and write the container header.
    fn open(&mut self, path: &Path) -> Result<(), CaptureError>;

    /// Append interleaved samples. The length is a whole number of frames.
    fn write(&mut self, samples: &[f32]) -> Result<(), CaptureError>;

    /// Finalize the header and release the file.
    fn close(&mut self) -> Result<(), CaptureError>;

    fn is_open(&self) -> bool;
}
