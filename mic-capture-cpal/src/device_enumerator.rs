//! Audio device enumeration across every cpal host compiled into this build.
//!
//! Each available host contributes one [`DeviceDescriptor`] per device, with
//! channel counts, default-device markers and the sample rates the device
//! reports for input (or output, for playback-only devices).

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host, SupportedStreamConfigRange};

use mic_capture_core::{format_device_table, AudioBackend, DeviceDescriptor};

use crate::host;

/// Rates probed inside each supported range. cpal reports ranges, not lists.
const COMMON_SAMPLE_RATES: [u32; 11] = [
    8000, 11025, 16000, 22050, 32000, 44100, 48000, 88200, 96000, 176400, 192000,
];

/// List devices on every backend that is compiled in and available.
///
/// Backends without devices contribute no rows. Device indices match the
/// order used by `DeviceSelector::Index` when opening a stream.
pub fn list_devices() -> Vec<DeviceDescriptor> {
    let mut devices = Vec::new();
    for backend in host::available_backends() {
        match host::open_host(Some(backend)) {
            Ok(host) => devices.extend(list_host_devices(backend, &host)),
            Err(e) => log::warn!("Skipping {}: {}", backend, e),
        }
    }
    devices
}

/// Devices with at least one input channel.
pub fn list_input_devices() -> Vec<DeviceDescriptor> {
    list_devices()
        .into_iter()
        .filter(|d| d.input_channels > 0)
        .collect()
}

/// Log the device table at info level.
pub fn print_device_list() {
    let devices = list_devices();
    if devices.is_empty() {
        log::info!("No audio devices found");
        return;
    }
    for line in format_device_table(&devices).lines() {
        log::info!("{}", line);
    }
}

fn list_host_devices(backend: AudioBackend, host: &Host) -> Vec<DeviceDescriptor> {
    let devices = match host.devices() {
        Ok(devices) => devices,
        Err(e) => {
            log::warn!("Failed to list {} devices: {}", backend, e);
            return Vec::new();
        }
    };

    let default_input = host.default_input_device().and_then(|d| d.name().ok());
    let default_output = host.default_output_device().and_then(|d| d.name().ok());

    devices
        .enumerate()
        .map(|(index, device)| {
            let name = device.name().unwrap_or_else(|_| format!("device {}", index));
            describe(backend, index, name, &device, &default_input, &default_output)
        })
        .collect()
}

fn describe(
    backend: AudioBackend,
    index: usize,
    name: String,
    device: &Device,
    default_input: &Option<String>,
    default_output: &Option<String>,
) -> DeviceDescriptor {
    let inputs: Vec<SupportedStreamConfigRange> = device
        .supported_input_configs()
        .map(|configs| configs.collect())
        .unwrap_or_default();
    let outputs: Vec<SupportedStreamConfigRange> = device
        .supported_output_configs()
        .map(|configs| configs.collect())
        .unwrap_or_default();

    let ranges = if inputs.is_empty() { &outputs } else { &inputs };
    let sample_rates = sample_rates(
        ranges
            .iter()
            .map(|r| (r.min_sample_rate().0, r.max_sample_rate().0)),
    );

    DeviceDescriptor {
        backend,
        index,
        is_default_input: default_input.as_deref() == Some(name.as_str()),
        is_default_output: default_output.as_deref() == Some(name.as_str()),
        name,
        input_channels: max_channels(&inputs),
        output_channels: max_channels(&outputs),
        sample_rates,
    }
}

fn max_channels(ranges: &[SupportedStreamConfigRange]) -> u16 {
    ranges.iter().map(|r| r.channels()).max().unwrap_or(0)
}

/// Ascending, deduplicated rates covered by the given `(min, max)` ranges:
/// every common rate inside a range plus the range bounds themselves.
pub(crate) fn sample_rates(ranges: impl IntoIterator<Item = (u32, u32)>) -> Vec<u32> {
    let mut rates = Vec::new();
    for (min, max) in ranges {
        rates.push(min);
        rates.push(max);
        rates.extend(
            COMMON_SAMPLE_RATES
                .iter()
                .copied()
                .filter(|r| (min..=max).contains(r)),
        );
    }
    rates.sort_unstable();
    rates.dedup();
    rates
}
