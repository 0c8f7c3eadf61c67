/// Borrowed view of one hardware callback period.
///
/// Samples are interleaved `f32`, `frames × channels` long. A trailing
/// partial frame in the source slice is not part of the view.
#[derive(Debug, Clone, Copy)]
pub struct SampleBuffer<'a> {
    samples: &'a [f32],
    channels: u16,
}

impl<'a> SampleBuffer<'a> {
    pub fn new(samples: &'a [f32], channels: u16) -> Self {
        let whole = if channels == 0 {
            0
        } else {
            samples.len() - samples.len() % channels as usize
        };
        Self {
            samples: &samples[..whole],
            channels,
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample of `channel` in frame `frame`.
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        self.samples[frame * self.channels as usize + channel]
    }
}

/// Per-channel loudness, instantaneous and smoothed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VolumeVector {
    pub rms: Vec<f32>,
    pub smoothed: Vec<f32>,
}

impl VolumeVector {
    pub fn channels(&self) -> usize {
        self.rms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_from_interleaved_stereo() {
        let samples = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let buffer = SampleBuffer::new(&samples, 2);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.sample(1, 1), 0.4);
        assert_eq!(buffer.sample(2, 0), 0.5);
    }

    #[test]
    fn partial_frame_is_dropped() {
        let samples = [0.1, 0.2, 0.3];
        let buffer = SampleBuffer::new(&samples, 2);
        assert_eq!(buffer.frames(), 1);
        assert_eq!(buffer.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn zero_channels_is_empty() {
        let buffer = SampleBuffer::new(&[0.5, 0.5], 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.frames(), 0);
    }
}
