use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use mic_capture_core::{AudioBackend, DeviceSelector, StreamConfig};

#[derive(Parser)]
#[command(name = "capture-demo", version, about = "Microphone capture sample app")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List audio devices on every available backend.
    Devices {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Record from an input device with a live volume meter.
    Record(RecordArgs),
}

#[derive(Args)]
pub struct RecordArgs {
    /// Audio backend (alsa, jack, coreaudio, wasapi, asio, ...). Platform default if omitted.
    #[arg(long)]
    pub backend: Option<AudioBackend>,

    /// Device index from `devices`, or an exact device name.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = 48000)]
    pub rate: u32,

    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Frames per hardware callback.
    #[arg(long, default_value_t = 512)]
    pub buffer_size: u32,

    #[arg(long, default_value_t = 4)]
    pub buffers: u32,

    /// Bit depth of the WAV file: 16, 24 or 32.
    #[arg(long, default_value_t = 16)]
    pub bits: u16,

    /// Recording length in seconds.
    #[arg(long, default_value_t = 5.0)]
    pub seconds: f64,

    /// Output file. Defaults to a timestamped name in the current directory.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl RecordArgs {
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            device: parse_device(self.device.as_deref()),
            backend: self.backend,
            sample_rate: self.rate,
            channels: self.channels,
            buffer_size: self.buffer_size,
            buffer_count: self.buffers,
            bits_per_sample: self.bits,
        }
    }
}

/// A bare number selects by index, anything else by name.
pub fn parse_device(arg: Option<&str>) -> DeviceSelector {
    match arg {
        None => DeviceSelector::Default,
        Some(s) => match s.parse::<usize>() {
            Ok(index) => DeviceSelector::Index(index),
            Err(_) => DeviceSelector::Name(s.to_string()),
        },
    }
}
