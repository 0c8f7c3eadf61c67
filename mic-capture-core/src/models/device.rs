use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating-system audio driver interface.
///
/// Which of these actually exist on a host is decided by the backend crate;
/// the list here is closed so callers can name any of them in a config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackend {
    Alsa,
    Pulse,
    Oss,
    Jack,
    CoreAudio,
    Wasapi,
    Asio,
    DirectSound,
}

impl AudioBackend {
    /// Every backend, in enumeration order.
    pub const ALL: [AudioBackend; 8] = [
        Self::Alsa,
        Self::Pulse,
        Self::Oss,
        Self::Jack,
        Self::CoreAudio,
        Self::Wasapi,
        Self::Asio,
        Self::DirectSound,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Alsa => "ALSA",
            Self::Pulse => "PulseAudio",
            Self::Oss => "OSS",
            Self::Jack => "JACK",
            Self::CoreAudio => "CoreAudio",
            Self::Wasapi => "WASAPI",
            Self::Asio => "ASIO",
            Self::DirectSound => "DirectSound",
        }
    }
}

impl std::fmt::Display for AudioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alsa" => Ok(Self::Alsa),
            "pulse" | "pulseaudio" => Ok(Self::Pulse),
            "oss" => Ok(Self::Oss),
            "jack" => Ok(Self::Jack),
            "coreaudio" | "core" | "osx" => Ok(Self::CoreAudio),
            "wasapi" => Ok(Self::Wasapi),
            "asio" => Ok(Self::Asio),
            "directsound" | "ds" => Ok(Self::DirectSound),
            other => Err(format!("unknown audio backend: {}", other)),
        }
    }
}

/// One device as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub backend: AudioBackend,
    /// Position within the backend's device list.
    pub index: usize,
    pub name: String,
    pub input_channels: u16,
    pub output_channels: u16,
    pub is_default_input: bool,
    pub is_default_output: bool,
    /// Supported sample rates in Hz, ascending.
    pub sample_rates: Vec<u32>,
}

const DRIVER_COLUMN: usize = 20;
const DEVICE_COLUMN: usize = 60;

/// Render devices as a fixed-width table, one row per device.
///
/// ```text
/// AUDIO DRIVER        | DEVICE                        | DETAILS
/// ALSA                | [0] default                   | in: 2  * | out: 2  * | rates: 44100 48000
/// ```
pub fn format_device_table(devices: &[DeviceDescriptor]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<dw$}| {:<vw$}| DETAILS",
        "AUDIO DRIVER",
        "DEVICE",
        dw = DRIVER_COLUMN,
        vw = DEVICE_COLUMN
    );
    let _ = writeln!(
        out,
        "{:<dw$}| {:<vw$}| -------",
        "------------",
        "------",
        dw = DRIVER_COLUMN,
        vw = DEVICE_COLUMN
    );

    for device in devices {
        let rates = device
            .sample_rates
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "{:<dw$}| {:<vw$}| in: {:<3}{} | out: {:<3}{} | rates: {}",
            device.backend.name(),
            format!("[{}] {}", device.index, device.name),
            device.input_channels,
            if device.is_default_input { "*" } else { " " },
            device.output_channels,
            if device.is_default_output { "*" } else { " " },
            rates,
            dw = DRIVER_COLUMN,
            vw = DEVICE_COLUMN
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mic() -> DeviceDescriptor {
        DeviceDescriptor {
            backend: AudioBackend::Alsa,
            index: 0,
            name: "USB Mic".into(),
            input_channels: 1,
            output_channels: 0,
            is_default_input: true,
            is_default_output: false,
            sample_rates: vec![44100, 48000],
        }
    }

    #[test]
    fn parses_backend_names() {
        assert_eq!("alsa".parse::<AudioBackend>(), Ok(AudioBackend::Alsa));
        assert_eq!("PulseAudio".parse::<AudioBackend>(), Ok(AudioBackend::Pulse));
        assert_eq!("ds".parse::<AudioBackend>(), Ok(AudioBackend::DirectSound));
        assert!("beos".parse::<AudioBackend>().is_err());
    }

    #[test]
    fn every_backend_round_trips_its_name() {
        for backend in AudioBackend::ALL {
            assert_eq!(backend.name().parse::<AudioBackend>(), Ok(backend));
        }
    }

    #[test]
    fn table_has_header_and_one_row_per_device() {
        let table = format_device_table(&[mic(), mic()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("AUDIO DRIVER"));
        assert!(lines[0].ends_with("| DETAILS"));
    }

    #[test]
    fn row_marks_defaults_and_lists_rates() {
        let table = format_device_table(&[mic()]);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("ALSA"));
        assert!(row.contains("| [0] USB Mic"));
        assert!(row.contains("in: 1  * | out: 0    | rates: 44100 48000"));
        // driver and device columns are fixed width
        assert_eq!(row.find("| [0]"), Some(DRIVER_COLUMN));
    }

    #[test]
    fn empty_list_is_just_the_header() {
        assert_eq!(format_device_table(&[]).lines().count(), 2);
    }
}
