use std::sync::Arc;

use crate::models::audio_models::SampleBuffer;
use crate::models::config::StreamConfig;
use crate::models::error::CaptureError;

/// Callback invoked once per hardware period with the captured samples.
///
/// Runs on the stream implementation's audio thread. It must not block
/// for long and must not panic.
pub type SampleCallback = Arc<dyn Fn(&SampleBuffer<'_>) + Send + Sync + 'static>;

/// Box a closure as a [`SampleCallback`].
pub fn sample_callback<F>(f: F) -> SampleCallback
where
    F: Fn(&SampleBuffer<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What a provider actually opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Name of the opened input device.
    pub device_name: String,
    /// Name of the backend/host it was opened on.
    pub backend_name: String,
}

/// Source of input sample buffers.
///
/// Implemented by:
/// - `CpalInputStream` (hardware input via cpal)
/// - [`ManualStream`](crate::session::manual::ManualStream) (caller pushes buffers)
pub trait StreamProvider {
    /// Open an input stream and start delivering buffers to `callback`.
    ///
    /// Any previously open stream must be closed by the caller first.
    fn open(
        &mut self,
        config: &StreamConfig,
        callback: SampleCallback,
    ) -> Result<StreamInfo, CaptureError>;

    /// Stop delivery and release the stream.
    ///
    /// Returns only once no callback is running.
    fn close(&mut self);

    /// Whether a stream is currently open.
    fn is_open(&self) -> bool;
}
