use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::models::config::SinkFormat;
use crate::models::error::CaptureError;
use crate::processing::pcm;
use crate::traits::audio_sink::AudioSink;

type WavFileWriter = WavWriter<BufWriter<File>>;

/// Streaming WAV writer backed by `hound`.
///
/// ## File Format
///
/// ```text
/// [RIFF/WAVE header, PCM format chunk]
/// [integer PCM data, little-endian, interleaved...]
/// ```
///
/// The RIFF and data chunk sizes are patched in `close`; until then the
/// file on disk has placeholder sizes.
pub struct WavSink {
    format: Option<SinkFormat>,
    writer: Option<WavFileWriter>,
    path: Option<PathBuf>,
    samples_written: u64,
}

impl WavSink {
    pub fn new() -> Self {
        Self {
            format: None,
            writer: None,
            path: None,
            samples_written: 0,
        }
    }

    pub fn format(&self) -> Option<SinkFormat> {
        self.format
    }

    /// Path of the open file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Samples (not frames) written to the open file.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

impl Default for WavSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for WavSink {
    fn set_format(&mut self, format: SinkFormat) {
        self.format = Some(format);
    }

    fn open(&mut self, path: &Path) -> Result<(), CaptureError> {
        if self.writer.is_some() {
            return Err(CaptureError::Storage("sink is already open".into()));
        }
        let format = self
            .format
            .ok_or_else(|| CaptureError::Storage("sink format not set".into()))?;
        format.validate().map_err(CaptureError::Storage)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::Storage(format!("failed to create directory: {}", e)))?;
        }

        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)
            .map_err(|e| CaptureError::Storage(format!("failed to create file: {}", e)))?;

        self.writer = Some(writer);
        self.path = Some(path.to_path_buf());
        self.samples_written = 0;
        Ok(())
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), CaptureError> {
        let (Some(writer), Some(format)) = (self.writer.as_mut(), self.format) else {
            return Err(CaptureError::Storage("file is not open for writing".into()));
        };

        for &sample in samples {
            writer
                .write_sample(pcm::quantize(sample, format.bits_per_sample))
                .map_err(|e| CaptureError::Storage(format!("write failed: {}", e)))?;
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| CaptureError::Storage("file is not open".into()))?;
        self.path = None;
        writer
            .finalize()
            .map_err(|e| CaptureError::Storage(format!("failed to finalize file: {}", e)))
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}
