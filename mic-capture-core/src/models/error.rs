use thiserror::Error;

/// Errors that can occur during capture and recording.
///
/// Only `configure` hands these back to the caller. Everything raised on
/// the recording path is reported through the log and the
/// [`CaptureDelegate`](crate::traits::capture_delegate::CaptureDelegate).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("capture is not configured")]
    NotConfigured,

    #[error("not recording: {0}")]
    NotRecording(String),

    #[error("unable to open sink: {0}")]
    SinkOpenFailed(String),

    #[error("unable to write audio: {0}")]
    SinkWriteFailed(String),

    #[error("audio input buffer empty")]
    EmptyBuffer,

    #[error("buffer has {actual} channels but the recording expects {expected}")]
    ChannelMismatch { expected: u16, actual: u16 },

    #[error("storage error: {0}")]
    Storage(String),
}
