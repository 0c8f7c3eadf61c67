use crate::models::audio_models::{SampleBuffer, VolumeVector};

/// Weight kept from the previous smoothed value on each buffer.
pub const SMOOTHING_DECAY: f64 = 0.93;

/// Weight given to the newest RMS value on each buffer.
pub const SMOOTHING_GAIN: f64 = 0.07;

/// Per-channel RMS meter with exponential smoothing for display.
///
/// The mean is taken over every sample in the buffer (`frames × channels`),
/// not per channel, so a stereo signal reads lower than the same signal
/// in mono. Meters calibrated against this scale depend on it.
#[derive(Debug, Clone, Default)]
pub struct VolumeEstimator {
    rms: Vec<f32>,
    smoothed: Vec<f32>,
}

impl VolumeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one buffer into the meter.
    ///
    /// Buffers without frames are skipped; they carry no level information
    /// and would otherwise divide by zero.
    pub fn update(&mut self, buffer: &SampleBuffer<'_>) {
        let channels = buffer.channels() as usize;
        let frames = buffer.frames();
        if channels == 0 || frames == 0 {
            return;
        }

        if self.rms.len() != channels {
            self.rms.resize(channels, 0.0);
        }
        if self.smoothed.len() != channels {
            self.smoothed.resize(channels, 0.0);
        }

        self.rms.iter_mut().for_each(|v| *v = 0.0);
        for frame in buffer.samples().chunks_exact(channels) {
            for (acc, &sample) in self.rms.iter_mut().zip(frame) {
                *acc += sample * sample;
            }
        }

        let count = (frames * channels) as f32;
        for vol in self.rms.iter_mut() {
            *vol = (*vol / count).sqrt();
        }

        // f64 per step, narrowed back to f32
        for (smoothed, &rms) in self.smoothed.iter_mut().zip(&self.rms) {
            *smoothed = (*smoothed as f64 * SMOOTHING_DECAY) as f32;
            *smoothed = (*smoothed as f64 + SMOOTHING_GAIN * rms as f64) as f32;
        }
    }

    pub fn rms(&self) -> &[f32] {
        &self.rms
    }

    pub fn smoothed(&self) -> &[f32] {
        &self.smoothed
    }

    pub fn snapshot(&self) -> VolumeVector {
        VolumeVector {
            rms: self.rms.clone(),
            smoothed: self.smoothed.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.rms.clear();
        self.smoothed.clear();
    }
}
