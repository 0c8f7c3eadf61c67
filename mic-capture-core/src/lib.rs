//! # mic-capture-core
//!
//! Platform-agnostic microphone capture engine.
//!
//! Provides the recording state machine, per-channel volume metering and a
//! WAV sink. Hardware backends implement the `StreamProvider` trait and
//! plug into the generic `CaptureEngine`.
//!
//! ## Architecture
//!
//! ```text
//! mic-capture-core (this crate)
//! ├── traits/       ← StreamProvider, AudioSink, CaptureDelegate
//! ├── models/       ← CaptureError, CaptureState, StreamConfig, SampleBuffer, DeviceDescriptor, etc.
//! ├── processing/   ← VolumeEstimator, PCM quantization
//! ├── session/      ← CaptureEngine (state machine), ManualStream
//! └── storage/      ← WavSink
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{SampleBuffer, VolumeVector};
pub use models::config::{DeviceSelector, SinkFormat, StreamConfig};
pub use models::device::{format_device_table, AudioBackend, DeviceDescriptor};
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingEnd, RecordingSummary};
pub use models::state::CaptureState;
pub use processing::volume::VolumeEstimator;
pub use session::engine::CaptureEngine;
pub use session::manual::{ManualStream, ManualStreamHandle};
pub use storage::wav_sink::WavSink;
pub use traits::audio_sink::AudioSink;
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::stream_provider::{sample_callback, SampleCallback, StreamInfo, StreamProvider};
