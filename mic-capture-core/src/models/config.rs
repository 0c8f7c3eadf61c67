use super::device::AudioBackend;

/// Bit depths the WAV sink can write.
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// Which input device a stream should open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// The backend's default input device.
    #[default]
    Default,
    /// Position in the backend's device list, as shown by the enumerator.
    Index(usize),
    /// Exact device name.
    Name(String),
}

impl std::fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Index(i) => write!(f, "[{}]", i),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Configuration for one capture session.
///
/// Replacing it means calling `configure` again, which tears down the
/// previous stream first.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Input device to open.
    pub device: DeviceSelector,

    /// Audio backend, or `None` for the platform default host.
    pub backend: Option<AudioBackend>,

    /// Sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Number of input channels (default: 1).
    pub channels: u16,

    /// Frames per hardware callback (default: 512).
    pub buffer_size: u32,

    /// Number of hardware buffers (default: 4). Advisory; not every
    /// backend exposes it.
    pub buffer_count: u32,

    /// Bit depth of recorded files (default: 16). Valid values: 16, 24, 32.
    pub bits_per_sample: u16,
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels == 0 {
            return Err("at least one input channel is required".into());
        }
        if self.buffer_size == 0 {
            return Err("buffer size must be positive".into());
        }
        if self.buffer_count == 0 {
            return Err("buffer count must be positive".into());
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        Ok(())
    }

    /// Format the sink is set to for this stream.
    pub fn sink_format(&self) -> SinkFormat {
        SinkFormat {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
        }
    }

    /// Time between two hardware callbacks.
    pub fn buffer_period_secs(&self) -> f64 {
        self.buffer_size as f64 / self.sample_rate as f64
    }

    /// Human-readable backend name for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        self.backend.map(|b| b.name()).unwrap_or("default")
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            device: DeviceSelector::Default,
            backend: None,
            sample_rate: 48000,
            channels: 1,
            buffer_size: 512,
            buffer_count: 4,
            bits_per_sample: 16,
        }
    }
}

/// PCM layout the sink writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl SinkFormat {
    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 {
            return Err("sink needs at least one channel".into());
        }
        if self.sample_rate == 0 {
            return Err("sink sample rate must be positive".into());
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        Ok(())
    }
}
