use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::models::audio_models::{SampleBuffer, VolumeVector};
use crate::models::config::{SinkFormat, StreamConfig};
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingEnd, RecordingSummary};
use crate::models::state::CaptureState;
use crate::processing::volume::VolumeEstimator;
use crate::storage::wav_sink::WavSink;
use crate::traits::audio_sink::AudioSink;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::stream_provider::{sample_callback, StreamInfo, StreamProvider};

/// File currently being recorded.
struct RecordingTarget {
    path: PathBuf,
    frames_written: u64,
}

/// State, sink and target. Always mutated together under one lock so the
/// audio thread sees either a fully open sink or none.
struct Recorder {
    state: CaptureState,
    sink: Box<dyn AudioSink>,
    format: Option<SinkFormat>,
    target: Option<RecordingTarget>,
    last_recording: Option<RecordingSummary>,
}

/// Everything the audio-thread callback needs, shared with the engine.
struct EngineShared {
    recorder: Mutex<Recorder>,
    volume: Mutex<VolumeEstimator>,
    delegate: RwLock<Option<Arc<dyn CaptureDelegate>>>,
}

impl EngineShared {
    fn delegate(&self) -> Option<Arc<dyn CaptureDelegate>> {
        self.delegate.read().clone()
    }

    fn report(&self, error: &CaptureError) {
        if let Some(delegate) = self.delegate() {
            delegate.on_error(error);
        }
    }

    fn transition(&self, rec: &mut Recorder, state: CaptureState) {
        if rec.state == state {
            return;
        }
        log::debug!("Capture state {} -> {}", rec.state, state);
        rec.state = state;
        if let Some(delegate) = self.delegate() {
            delegate.on_state_changed(state);
        }
    }

    /// Hardware callback entry point.
    fn deliver(&self, buffer: &SampleBuffer<'_>) {
        self.volume.lock().update(buffer);
        self.record(buffer.samples(), Some(buffer.channels()));
    }

    /// Write to the open target, if any. `channels` is checked against the
    /// sink format when known.
    fn record(&self, samples: &[f32], channels: Option<u16>) {
        let mut rec = self.recorder.lock();
        if !rec.state.is_recording() {
            return;
        }
        let Some(format) = rec.format else {
            return;
        };

        if samples.is_empty() {
            let error = CaptureError::EmptyBuffer;
            log::error!("Audio input buffer empty!");
            self.report(&error);
            return;
        }
        if let Some(actual) = channels.filter(|&c| c != format.channels) {
            let error = CaptureError::ChannelMismatch {
                expected: format.channels,
                actual,
            };
            log::error!("Dropping audio buffer: {}", error);
            self.report(&error);
            return;
        }

        let whole = samples.len() - samples.len() % format.channels as usize;
        let samples = &samples[..whole];
        if samples.is_empty() {
            return;
        }

        match rec.sink.write(samples) {
            Ok(()) => {
                if let Some(target) = rec.target.as_mut() {
                    target.frames_written += (whole / format.channels as usize) as u64;
                }
            }
            Err(e) => {
                let path = rec
                    .target
                    .as_ref()
                    .map(|t| t.path.display().to_string())
                    .unwrap_or_default();
                let error = CaptureError::SinkWriteFailed(format!("{}: {}", path, e));
                log::error!("Unable to write audio to [{}]: {}", path, e);
                self.report(&error);
                self.finish_recording(&mut rec, RecordingEnd::WriteFailed);
            }
        }
    }

    /// Close the sink of the active target and settle on `Ready`.
    fn finish_recording(&self, rec: &mut Recorder, ended_by: RecordingEnd) -> Option<RecordingSummary> {
        let target = rec.target.take()?;

        let finalized = match rec.sink.close() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to finalize [{}]: {}", target.path.display(), e);
                self.report(&e);
                false
            }
        };
        self.transition(rec, CaptureState::Ready);

        let (sample_rate, channels) = rec
            .format
            .map(|f| (f.sample_rate, f.channels))
            .unwrap_or_default();
        let summary = RecordingSummary::new(
            target.path,
            target.frames_written,
            sample_rate,
            channels,
            ended_by,
            finalized,
        );
        log::info!(
            "Ended recording to file [{}] ({} frames, {:.2}s)",
            summary.file_path.display(),
            summary.frames_written,
            summary.duration_secs
        );

        if let Some(delegate) = self.delegate() {
            delegate.on_recording_finished(&summary);
        }
        rec.last_recording = Some(summary.clone());
        Some(summary)
    }
}

/// Microphone capture engine.
///
/// Receives buffers from a [`StreamProvider`] on the audio thread, keeps a
/// per-channel volume meter, and writes buffers to an [`AudioSink`] while
/// recording.
///
/// ```text
/// [StreamProvider] ─ callback ─→ [VolumeEstimator]
///                           └──→ [AudioSink]   (only while recording)
/// ```
///
/// `configure` reports failure through its return value. Recording
/// controls report only through the log and the [`CaptureDelegate`];
/// callers observe the outcome by polling [`state`](Self::state).
pub struct CaptureEngine<P: StreamProvider> {
    provider: P,
    config: Option<StreamConfig>,
    stream_info: Option<StreamInfo>,
    shared: Arc<EngineShared>,
}

impl<P: StreamProvider> CaptureEngine<P> {
    /// Engine recording WAV files.
    pub fn new(provider: P) -> Self {
        Self::with_sink(provider, Box::new(WavSink::new()))
    }

    pub fn with_sink(provider: P, sink: Box<dyn AudioSink>) -> Self {
        Self {
            provider,
            config: None,
            stream_info: None,
            shared: Arc::new(EngineShared {
                recorder: Mutex::new(Recorder {
                    state: CaptureState::Uninitialized,
                    sink,
                    format: None,
                    target: None,
                    last_recording: None,
                }),
                volume: Mutex::new(VolumeEstimator::new()),
                delegate: RwLock::new(None),
            }),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        *self.shared.delegate.write() = Some(delegate);
    }

    pub fn state(&self) -> CaptureState {
        self.shared.recorder.lock().state
    }

    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    pub fn config(&self) -> Option<&StreamConfig> {
        self.config.as_ref()
    }

    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream_info.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Path of the file being recorded, if any.
    pub fn recording_target(&self) -> Option<PathBuf> {
        self.shared
            .recorder
            .lock()
            .target
            .as_ref()
            .map(|t| t.path.clone())
    }

    /// Summary of the most recently closed recording.
    pub fn last_recording(&self) -> Option<RecordingSummary> {
        self.shared.recorder.lock().last_recording.clone()
    }

    /// Per-channel RMS of the latest buffer. Empty before the first buffer.
    pub fn volume(&self) -> Vec<f32> {
        self.shared.volume.lock().rms().to_vec()
    }

    /// Per-channel smoothed volume. Empty before the first buffer.
    pub fn smoothed_volume(&self) -> Vec<f32> {
        self.shared.volume.lock().smoothed().to_vec()
    }

    pub fn volume_snapshot(&self) -> VolumeVector {
        self.shared.volume.lock().snapshot()
    }

    /// Open an input stream and get ready to record.
    ///
    /// Tears down any previous stream first, finalizing an active recording.
    /// On failure the engine is left `Uninitialized`.
    pub fn configure(&mut self, config: StreamConfig) -> Result<(), CaptureError> {
        self.teardown(RecordingEnd::Reconfigured);

        if let Err(reason) = config.validate() {
            let error = CaptureError::InvalidConfiguration(reason);
            log::error!("Error setting up sound stream: {}", error);
            self.shared.report(&error);
            return Err(error);
        }

        let shared = Arc::clone(&self.shared);
        let callback = sample_callback(move |buffer| shared.deliver(buffer));

        match self.provider.open(&config, callback) {
            Ok(info) => {
                log::info!(
                    "Successfully setup sound stream, device: {} {} {} ({} Hz, {} ch, {} frames x {} buffers)",
                    info.backend_name,
                    config.device,
                    info.device_name,
                    config.sample_rate,
                    config.channels,
                    config.buffer_size,
                    config.buffer_count
                );
                self.set_format(config.sink_format());
                self.config = Some(config);
                self.stream_info = Some(info);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Error setting up sound stream, device: {} {}: {}",
                    config.backend_name(),
                    config.device,
                    e
                );
                self.shared.report(&e);
                Err(e)
            }
        }
    }

    /// Get ready to record buffers pushed through [`deliver`](Self::deliver)
    /// or [`write_samples`](Self::write_samples), without opening a stream.
    pub fn configure_manual(
        &mut self,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
    ) -> Result<(), CaptureError> {
        self.teardown(RecordingEnd::Reconfigured);

        let format = SinkFormat {
            channels,
            sample_rate,
            bits_per_sample,
        };
        if let Err(reason) = format.validate() {
            let error = CaptureError::InvalidConfiguration(reason);
            log::error!("Error setting up manual recorder: {}", error);
            self.shared.report(&error);
            return Err(error);
        }

        self.set_format(format);
        log::info!(
            "Manual recorder ready ({} Hz, {} ch, {} bit)",
            sample_rate,
            channels,
            bits_per_sample
        );
        Ok(())
    }

    /// Start recording to `path`.
    ///
    /// An active recording is closed first. If the file cannot be opened the
    /// engine stays `Ready`.
    pub fn begin_recording(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let shared = &self.shared;
        let mut rec = shared.recorder.lock();

        let state = rec.state;
        match state {
            CaptureState::Uninitialized => {
                log::error!(
                    "Can't start recording to [{}], audio capture uninitialized!",
                    path.display()
                );
                shared.report(&CaptureError::NotConfigured);
                return;
            }
            CaptureState::Recording => {
                log::warn!(
                    "Recording started, but already recording! Closing previous recording at [{}] and starting new one at [{}]",
                    rec.target
                        .as_ref()
                        .map(|t| t.path.display().to_string())
                        .unwrap_or_default(),
                    path.display()
                );
                shared.finish_recording(&mut rec, RecordingEnd::Replaced);
            }
            CaptureState::Ready => {}
        }

        match rec.sink.open(path) {
            Ok(()) => {
                rec.target = Some(RecordingTarget {
                    path: path.to_path_buf(),
                    frames_written: 0,
                });
                shared.transition(&mut rec, CaptureState::Recording);
                log::info!("Starting recording to file [{}]", path.display());
            }
            Err(e) => {
                let error = CaptureError::SinkOpenFailed(format!("{}: {}", path.display(), e));
                log::error!("Unable to open wav file for recording [{}]: {}", path.display(), e);
                shared.transition(&mut rec, CaptureState::Ready);
                shared.report(&error);
            }
        }
    }

    /// Stop recording and finalize the file before returning.
    pub fn end_recording(&self) {
        let shared = &self.shared;
        let mut rec = shared.recorder.lock();
        let state = rec.state;
        match state {
            CaptureState::Recording => {
                shared.finish_recording(&mut rec, RecordingEnd::Stopped);
            }
            CaptureState::Ready | CaptureState::Uninitialized => {
                let reason = if state == CaptureState::Ready {
                    "recording not started"
                } else {
                    "audio capture uninitialized"
                };
                log::error!("Unable to end recording - {}!", reason);
                shared.report(&CaptureError::NotRecording(reason.into()));
            }
        }
    }

    /// Feed one buffer as if it came from the stream: update the volume
    /// meter, then record it when recording.
    pub fn deliver(&self, buffer: &SampleBuffer<'_>) {
        self.shared.deliver(buffer);
    }

    /// Record interleaved samples without touching the volume meter.
    ///
    /// The slice is laid out in the sink's channel count; a trailing
    /// partial frame is dropped.
    pub fn write_samples(&self, samples: &[f32]) {
        self.shared.record(samples, None);
    }

    fn set_format(&self, format: SinkFormat) {
        let mut rec = self.shared.recorder.lock();
        rec.sink.set_format(format);
        rec.format = Some(format);
        self.shared.transition(&mut rec, CaptureState::Ready);
    }

    /// Stop the stream, then close any recording and drop the format.
    fn teardown(&mut self, ended_by: RecordingEnd) {
        if self.provider.is_open() {
            self.provider.close();
            if let Some(info) = self.stream_info.take() {
                log::info!("Closed sound stream on {} ({})", info.backend_name, info.device_name);
            }
        }
        self.stream_info = None;
        self.config = None;

        {
            let mut rec = self.shared.recorder.lock();
            self.shared.finish_recording(&mut rec, ended_by);
            rec.format = None;
            self.shared.transition(&mut rec, CaptureState::Uninitialized);
        }
        self.shared.volume.lock().reset();
    }
}

impl<P: StreamProvider> Drop for CaptureEngine<P> {
    fn drop(&mut self) {
        self.teardown(RecordingEnd::Dropped);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::session::manual::{ManualStream, ManualStreamHandle};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        State(CaptureState),
        Error(CaptureError),
        Finished(RecordingEnd),
    }

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<Event>>,
    }

    impl EventLog {
        fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    impl CaptureDelegate for EventLog {
        fn on_state_changed(&self, state: CaptureState) {
            self.events.lock().push(Event::State(state));
        }

        fn on_error(&self, error: &CaptureError) {
            self.events.lock().push(Event::Error(error.clone()));
        }

        fn on_recording_finished(&self, summary: &RecordingSummary) {
            self.events.lock().push(Event::Finished(summary.ended_by));
        }
    }

    fn engine() -> (CaptureEngine<ManualStream>, ManualStreamHandle, Arc<EventLog>) {
        let stream = ManualStream::new();
        let handle = stream.handle();
        let mut engine = CaptureEngine::new(stream);
        let log = Arc::new(EventLog::default());
        engine.set_delegate(log.clone());
        (engine, handle, log)
    }

    #[test]
    fn configure_reaches_ready() {
        let (mut engine, _, log) = engine();
        assert_eq!(engine.state(), CaptureState::Uninitialized);

        engine.configure(StreamConfig::default()).unwrap();
        assert_eq!(engine.state(), CaptureState::Ready);
        assert_eq!(engine.stream_info().unwrap().backend_name, "manual");
        assert_eq!(log.take(), vec![Event::State(CaptureState::Ready)]);
    }

    #[test]
    fn invalid_config_stays_uninitialized() {
        let (mut engine, handle, _) = engine();
        let config = StreamConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            engine.configure(config),
            Err(CaptureError::InvalidConfiguration(_))
        ));
        assert_eq!(engine.state(), CaptureState::Uninitialized);
        assert!(!handle.is_open());
    }

    #[test]
    fn begin_while_uninitialized_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.wav");
        let (engine, _, log) = engine();

        engine.begin_recording(&path);

        assert_eq!(engine.state(), CaptureState::Uninitialized);
        assert!(!path.exists());
        assert_eq!(log.take(), vec![Event::Error(CaptureError::NotConfigured)]);
    }

    #[test]
    fn redundant_stop_reports_once() {
        let (mut engine, _, log) = engine();
        engine.configure(StreamConfig::default()).unwrap();
        log.take();

        engine.end_recording();

        assert_eq!(engine.state(), CaptureState::Ready);
        assert_eq!(
            log.take(),
            vec![Event::Error(CaptureError::NotRecording(
                "recording not started".into()
            ))]
        );
    }

    #[test]
    fn delivery_outside_recording_only_meters() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, _) = engine();
        engine.configure(StreamConfig::default()).unwrap();

        assert!(handle.push(&[0.5, -0.5]));

        assert_relative_eq!(engine.volume()[0], 0.5);
        assert_relative_eq!(engine.smoothed_volume()[0], 0.035, epsilon = 1e-6);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(engine.last_recording().is_none());
    }

    #[test]
    fn volume_is_empty_before_first_buffer() {
        let (engine, _, _) = engine();
        assert!(engine.volume().is_empty());
        assert_eq!(engine.volume_snapshot(), VolumeVector::default());
    }

    #[test]
    fn record_and_stop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let (mut engine, handle, log) = engine();
        engine.configure(StreamConfig::default()).unwrap();

        engine.begin_recording(&path);
        assert_eq!(engine.state(), CaptureState::Recording);
        assert_eq!(engine.recording_target(), Some(path.clone()));

        handle.push(&[0.1; 512]);
        handle.push(&[0.2; 512]);
        engine.end_recording();

        assert_eq!(engine.state(), CaptureState::Ready);
        assert_eq!(engine.recording_target(), None);
        let summary = engine.last_recording().unwrap();
        assert_eq!(summary.frames_written, 1024);
        assert_eq!(summary.ended_by, RecordingEnd::Stopped);
        assert!(summary.finalized);
        assert_eq!(hound::WavReader::open(&path).unwrap().len(), 1024);

        assert_eq!(
            log.take(),
            vec![
                Event::State(CaptureState::Ready),
                Event::State(CaptureState::Recording),
                Event::State(CaptureState::Ready),
                Event::Finished(RecordingEnd::Stopped),
            ]
        );
    }

    #[test]
    fn unwritable_path_settles_on_ready() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let (mut engine, _, log) = engine();
        engine.configure(StreamConfig::default()).unwrap();
        log.take();

        engine.begin_recording(blocker.join("take.wav"));

        assert_eq!(engine.state(), CaptureState::Ready);
        assert_eq!(engine.recording_target(), None);
        let events = log.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::Error(CaptureError::SinkOpenFailed(_))));
    }

    #[test]
    fn empty_buffer_is_reported_but_recording_continues() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, handle, log) = engine();
        engine.configure(StreamConfig::default()).unwrap();
        engine.begin_recording(dir.path().join("take.wav"));
        log.take();

        handle.push(&[]);

        assert_eq!(engine.state(), CaptureState::Recording);
        assert_eq!(log.take(), vec![Event::Error(CaptureError::EmptyBuffer)]);
        engine.end_recording();
    }

    #[test]
    fn mismatched_channels_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _, log) = engine();
        engine.configure(StreamConfig::default()).unwrap();
        engine.begin_recording(dir.path().join("take.wav"));
        log.take();

        engine.deliver(&SampleBuffer::new(&[0.1, 0.1, 0.1, 0.1], 2));

        assert_eq!(
            log.take(),
            vec![Event::Error(CaptureError::ChannelMismatch {
                expected: 1,
                actual: 2
            })]
        );
        engine.end_recording();
        assert_eq!(engine.last_recording().unwrap().frames_written, 0);
    }

    #[test]
    fn manual_recorder_writes_without_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.wav");
        let (mut engine, handle, _) = engine();

        engine.configure_manual(2, 44100, 16).unwrap();
        assert_eq!(engine.state(), CaptureState::Ready);
        assert!(!handle.is_open());

        engine.begin_recording(&path);
        engine.write_samples(&[0.5, -0.5, 0.25, -0.25, 0.1]);
        engine.end_recording();

        assert!(engine.volume().is_empty());
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        assert_eq!(reader.duration(), 2);
    }

    #[test]
    fn reconfigure_finalizes_active_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let (mut engine, handle, _) = engine();
        engine.configure(StreamConfig::default()).unwrap();
        engine.begin_recording(&path);
        handle.push(&[0.3; 64]);

        engine
            .configure(StreamConfig {
                channels: 2,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(engine.state(), CaptureState::Ready);
        let summary = engine.last_recording().unwrap();
        assert_eq!(summary.ended_by, RecordingEnd::Reconfigured);
        assert_eq!(hound::WavReader::open(&path).unwrap().len(), 64);
        assert!(engine.volume().is_empty());
    }

    #[test]
    fn drop_finalizes_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        {
            let (mut engine, handle, _) = engine();
            engine.configure(StreamConfig::default()).unwrap();
            engine.begin_recording(&path);
            handle.push(&[0.3; 100]);
        }
        assert_eq!(hound::WavReader::open(&path).unwrap().len(), 100);
    }
}
