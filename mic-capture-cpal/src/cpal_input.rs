//! Hardware input stream provider built on cpal.
//!
//! Opens an input device on the configured host, picks the native sample
//! format closest to `f32` that supports the requested channels and rate,
//! and delivers interleaved `f32` buffers to the engine's callback on the
//! cpal audio thread.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, BuildStreamError, Device, FromSample, Host, Sample, SampleFormat, SampleRate,
    SizedSample, SupportedBufferSize, SupportedStreamConfigRange,
};
use parking_lot::Mutex;

use mic_capture_core::{
    CaptureError, DeviceSelector, SampleBuffer, SampleCallback, StreamConfig, StreamInfo,
    StreamProvider,
};

use crate::host;

/// Native formats in order of preference. Anything else is converted too,
/// but these lose nothing on the way to `f32`.
const PREFERRED_FORMATS: [SampleFormat; 3] =
    [SampleFormat::F32, SampleFormat::I32, SampleFormat::I16];

/// Microphone input through cpal.
///
/// `cpal::Stream` is not `Send` on every platform, so neither is this type:
/// open and close it from the thread that owns the engine.
#[derive(Default)]
pub struct CpalInputStream {
    stream: Option<cpal::Stream>,
    sample_format: Option<SampleFormat>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl CpalInputStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native format of the open stream.
    pub fn sample_format(&self) -> Option<SampleFormat> {
        self.sample_format
    }

    /// Most recent error reported by the running stream, if any.
    ///
    /// The audio thread cannot return errors, so they are kept here for the
    /// owner to poll.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl StreamProvider for CpalInputStream {
    fn open(
        &mut self,
        config: &StreamConfig,
        callback: SampleCallback,
    ) -> Result<StreamInfo, CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::ConfigurationFailed(
                "input stream already open".into(),
            ));
        }

        let host = host::open_host(config.backend).map_err(CaptureError::ConfigurationFailed)?;
        let device = find_device(&host, &config.device)?;
        let device_name = device.name().unwrap_or_else(|_| config.device.to_string());

        let range = matching_range(&device, config)?;
        let sample_format = range.sample_format();
        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: buffer_size(range.buffer_size(), config.buffer_size)?,
        };
        log::debug!(
            "Opening {} on {}: {:?}, {:?}",
            device_name,
            host.id().name(),
            stream_config,
            sample_format
        );

        *self.last_error.lock() = None;
        let stream = build_stream(
            &device,
            &stream_config,
            sample_format,
            callback,
            self.last_error.clone(),
        )
        .map_err(|e| CaptureError::ConfigurationFailed(format!("{}: {}", device_name, e)))?;
        stream
            .play()
            .map_err(|e| CaptureError::ConfigurationFailed(format!("{}: {}", device_name, e)))?;

        self.stream = Some(stream);
        self.sample_format = Some(sample_format);
        Ok(StreamInfo {
            device_name,
            backend_name: host.id().name().to_string(),
        })
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("Pausing input stream failed: {}", e);
            }
            // Dropping the stream stops the audio thread before returning.
            drop(stream);
            log::debug!("Input stream closed");
        }
        self.sample_format = None;
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for CpalInputStream {
    fn drop(&mut self) {
        self.close();
    }
}

fn find_device(host: &Host, selector: &DeviceSelector) -> Result<Device, CaptureError> {
    let listing_failed =
        |e: cpal::DevicesError| CaptureError::DeviceNotAvailable(format!("{}: {}", selector, e));

    let device = match selector {
        DeviceSelector::Default => host.default_input_device(),
        DeviceSelector::Index(index) => host.devices().map_err(listing_failed)?.nth(*index),
        DeviceSelector::Name(name) => host
            .input_devices()
            .map_err(listing_failed)?
            .find(|d| d.name().map(|n| &n == name).unwrap_or(false)),
    };
    device.ok_or_else(|| {
        CaptureError::DeviceNotAvailable(format!(
            "no input device {} on {}",
            selector,
            host.id().name()
        ))
    })
}

/// Supported input range covering the requested channels and rate, in the
/// best available sample format.
fn matching_range(
    device: &Device,
    config: &StreamConfig,
) -> Result<SupportedStreamConfigRange, CaptureError> {
    let ranges: Vec<SupportedStreamConfigRange> = device
        .supported_input_configs()
        .map_err(|e| CaptureError::ConfigurationFailed(e.to_string()))?
        .filter(|r| {
            r.channels() == config.channels
                && r.min_sample_rate().0 <= config.sample_rate
                && config.sample_rate <= r.max_sample_rate().0
        })
        .collect();

    let formats: Vec<SampleFormat> = ranges.iter().map(|r| r.sample_format()).collect();
    let chosen = preferred_format(&formats).ok_or_else(|| {
        CaptureError::ConfigurationFailed(format!(
            "device does not support {} channel(s) at {} Hz",
            config.channels, config.sample_rate
        ))
    })?;
    ranges
        .into_iter()
        .find(|r| r.sample_format() == chosen)
        .ok_or_else(|| CaptureError::ConfigurationFailed("no matching input range".into()))
}

/// Best format among `available`: a preferred one if present, otherwise the
/// first one this crate can convert.
pub(crate) fn preferred_format(available: &[SampleFormat]) -> Option<SampleFormat> {
    PREFERRED_FORMATS
        .into_iter()
        .find(|f| available.contains(f))
        .or_else(|| available.iter().copied().find(|f| is_convertible(*f)))
}

fn is_convertible(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::I8
            | SampleFormat::I16
            | SampleFormat::I32
            | SampleFormat::U8
            | SampleFormat::U16
            | SampleFormat::U32
            | SampleFormat::F32
            | SampleFormat::F64
    )
}

/// cpal buffer size for `frames` per callback.
///
/// Hosts that cannot report a range get the host default; the requested
/// size is then only a hint.
pub(crate) fn buffer_size(
    supported: &SupportedBufferSize,
    frames: u32,
) -> Result<BufferSize, CaptureError> {
    match *supported {
        SupportedBufferSize::Range { min, max } if (min..=max).contains(&frames) => {
            Ok(BufferSize::Fixed(frames))
        }
        SupportedBufferSize::Range { min, max } => Err(CaptureError::ConfigurationFailed(
            format!("buffer size {} outside device range {}..={}", frames, min, max),
        )),
        SupportedBufferSize::Unknown => {
            log::debug!("Host reports no buffer range, using its default size");
            Ok(BufferSize::Default)
        }
    }
}

fn build_stream(
    device: &Device,
    config: &cpal::StreamConfig,
    format: SampleFormat,
    callback: SampleCallback,
    last_error: Arc<Mutex<Option<String>>>,
) -> Result<cpal::Stream, BuildStreamError> {
    let on_error = move |err: cpal::StreamError| {
        log::error!("Audio stream error: {}", err);
        *last_error.lock() = Some(err.to_string());
    };
    let channels = config.channels;

    match format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                callback(&SampleBuffer::new(data, channels));
            },
            on_error,
            None,
        ),
        SampleFormat::I8 => build_converting::<i8>(device, config, callback, on_error),
        SampleFormat::I16 => build_converting::<i16>(device, config, callback, on_error),
        SampleFormat::I32 => build_converting::<i32>(device, config, callback, on_error),
        SampleFormat::U8 => build_converting::<u8>(device, config, callback, on_error),
        SampleFormat::U16 => build_converting::<u16>(device, config, callback, on_error),
        SampleFormat::U32 => build_converting::<u32>(device, config, callback, on_error),
        SampleFormat::F64 => build_converting::<f64>(device, config, callback, on_error),
        _ => Err(BuildStreamError::StreamConfigNotSupported),
    }
}

/// Input stream in a non-`f32` format, converted through a scratch buffer
/// that is reused across callbacks.
fn build_converting<T>(
    device: &Device,
    config: &cpal::StreamConfig,
    callback: SampleCallback,
    on_error: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels;
    let mut scratch: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(data.iter().map(|&s| f32::from_sample(s)));
            callback(&SampleBuffer::new(&scratch, channels));
        },
        on_error,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mic_capture_core::AudioBackend;

    #[test]
    fn float_input_is_preferred() {
        let formats = [SampleFormat::I16, SampleFormat::F32, SampleFormat::U8];
        assert_eq!(preferred_format(&formats), Some(SampleFormat::F32));
    }

    #[test]
    fn wider_integers_beat_narrower_ones() {
        let formats = [SampleFormat::U8, SampleFormat::I16, SampleFormat::I32];
        assert_eq!(preferred_format(&formats), Some(SampleFormat::I32));
    }

    #[test]
    fn any_convertible_format_is_accepted() {
        assert_eq!(
            preferred_format(&[SampleFormat::U16]),
            Some(SampleFormat::U16)
        );
        assert_eq!(preferred_format(&[]), None);
    }

    #[test]
    fn buffer_size_within_range_is_fixed() {
        let range = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(buffer_size(&range, 512), Ok(BufferSize::Fixed(512)));
        assert_eq!(buffer_size(&range, 64), Ok(BufferSize::Fixed(64)));
    }

    #[test]
    fn buffer_size_outside_range_fails() {
        let range = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert!(matches!(
            buffer_size(&range, 8192),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn unknown_buffer_range_uses_host_default() {
        assert_eq!(
            buffer_size(&SupportedBufferSize::Unknown, 512),
            Ok(BufferSize::Default)
        );
    }

    #[test]
    fn uncompiled_backend_fails_to_open() {
        let mut stream = CpalInputStream::new();
        let config = StreamConfig {
            backend: Some(AudioBackend::DirectSound),
            ..Default::default()
        };
        let callback = mic_capture_core::sample_callback(|_| {});
        let err = stream.open(&config, callback).unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
        assert!(!stream.is_open());
    }
}
