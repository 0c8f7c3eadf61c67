use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::SampleBuffer;
use crate::models::config::StreamConfig;
use crate::models::error::CaptureError;
use crate::traits::stream_provider::{SampleCallback, StreamInfo, StreamProvider};

#[derive(Default)]
struct ManualSlot {
    callback: Option<SampleCallback>,
    channels: u16,
}

/// Push side of a [`ManualStream`].
///
/// Cloneable and `Send`, so buffers can be fed from any thread: a file
/// reader, a network receiver, or a test standing in for the audio thread.
/// Pushes are serialized; one buffer is fully delivered before the next.
#[derive(Clone, Default)]
pub struct ManualStreamHandle {
    slot: Arc<Mutex<ManualSlot>>,
}

impl ManualStreamHandle {
    /// Deliver interleaved samples using the stream's channel count.
    ///
    /// Returns `false` when no stream is open and nothing was delivered.
    pub fn push(&self, samples: &[f32]) -> bool {
        let slot = self.slot.lock();
        let Some(callback) = slot.callback.as_ref() else {
            return false;
        };
        callback(&SampleBuffer::new(samples, slot.channels));
        true
    }

    /// Deliver a buffer with an explicit channel count.
    pub fn push_buffer(&self, buffer: &SampleBuffer<'_>) -> bool {
        let slot = self.slot.lock();
        let Some(callback) = slot.callback.as_ref() else {
            return false;
        };
        callback(buffer);
        true
    }

    pub fn is_open(&self) -> bool {
        self.slot.lock().callback.is_some()
    }
}

/// Stream provider without hardware: the caller pushes buffers through a
/// [`ManualStreamHandle`].
#[derive(Default)]
pub struct ManualStream {
    handle: ManualStreamHandle,
}

impl ManualStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ManualStreamHandle {
        self.handle.clone()
    }
}

impl StreamProvider for ManualStream {
    fn open(
        &mut self,
        config: &StreamConfig,
        callback: SampleCallback,
    ) -> Result<StreamInfo, CaptureError> {
        let mut slot = self.handle.slot.lock();
        if slot.callback.is_some() {
            return Err(CaptureError::ConfigurationFailed(
                "manual stream already open".into(),
            ));
        }
        slot.callback = Some(callback);
        slot.channels = config.channels;
        Ok(StreamInfo {
            device_name: "manual input".into(),
            backend_name: "manual".into(),
        })
    }

    fn close(&mut self) {
        // Taking the lock waits out any push in progress.
        let mut slot = self.handle.slot.lock();
        slot.callback = None;
    }

    fn is_open(&self) -> bool {
        self.handle.is_open()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::traits::stream_provider::sample_callback;

    fn counting_callback(counter: Arc<AtomicUsize>) -> SampleCallback {
        sample_callback(move |buffer| {
            counter.fetch_add(buffer.frames(), Ordering::SeqCst);
        })
    }

    #[test]
    fn push_without_open_is_dropped() {
        let stream = ManualStream::new();
        assert!(!stream.handle().push(&[0.0, 0.0]));
    }

    #[test]
    fn push_uses_configured_channels() {
        let frames = Arc::new(AtomicUsize::new(0));
        let mut stream = ManualStream::new();
        let config = StreamConfig {
            channels: 2,
            ..Default::default()
        };
        stream.open(&config, counting_callback(frames.clone())).unwrap();

        assert!(stream.handle().push(&[0.0; 8]));
        assert_eq!(frames.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn close_stops_delivery() {
        let frames = Arc::new(AtomicUsize::new(0));
        let mut stream = ManualStream::new();
        let handle = stream.handle();
        stream
            .open(&StreamConfig::default(), counting_callback(frames.clone()))
            .unwrap();
        stream.close();

        assert!(!stream.is_open());
        assert!(!handle.push(&[0.0; 4]));
        assert_eq!(frames.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn second_open_is_rejected() {
        let frames = Arc::new(AtomicUsize::new(0));
        let mut stream = ManualStream::new();
        let config = StreamConfig::default();
        stream.open(&config, counting_callback(frames.clone())).unwrap();
        assert!(stream.open(&config, counting_callback(frames)).is_err());
    }
}
