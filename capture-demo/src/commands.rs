use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use mic_capture_core::CaptureEngine;
use mic_capture_cpal::{list_devices, CpalInputStream};

use crate::cli::RecordArgs;
use crate::delegate::LogDelegate;
use crate::meter;

const METER_INTERVAL: Duration = Duration::from_millis(50);

pub fn devices(json: bool) -> Result<()> {
    let devices = list_devices();
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else if devices.is_empty() {
        println!("No audio devices found");
    } else {
        print!("{}", mic_capture_core::format_device_table(&devices));
    }
    Ok(())
}

pub fn record(args: RecordArgs) -> Result<()> {
    if !(args.seconds > 0.0 && args.seconds.is_finite()) {
        bail!("--seconds must be a positive number");
    }
    let path = args.output.clone().unwrap_or_else(timestamped_file_name);

    let mut engine = CaptureEngine::new(CpalInputStream::new());
    engine.set_delegate(Arc::new(LogDelegate));
    engine
        .configure(args.stream_config())
        .context("failed to open input stream")?;
    if let Some(info) = engine.stream_info() {
        log::info!("Recording from {} ({})", info.device_name, info.backend_name);
    }

    engine.begin_recording(&path);
    if !engine.is_recording() {
        bail!("could not start recording to {}", path.display());
    }

    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds);
    let mut stdout = std::io::stdout();
    while Instant::now() < deadline && engine.is_recording() {
        let level = engine.smoothed_volume().first().copied().unwrap_or(0.0);
        write!(stdout, "\r{} {:.4}", meter::bar(level), level)?;
        stdout.flush()?;
        if let Some(err) = engine.provider().last_error() {
            log::warn!("Stream reported: {}", err);
        }
        thread::sleep(METER_INTERVAL);
    }
    println!();

    engine.end_recording();
    let summary = engine
        .last_recording()
        .context("recording produced no summary")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if !summary.finalized {
        bail!("{} was not finalized", summary.file_path.display());
    }
    Ok(())
}

/// `YYYY-MM-DD-HH-MM-SS-mmm.wav` in the current directory.
fn timestamped_file_name() -> PathBuf {
    PathBuf::from(format!(
        "{}.wav",
        chrono::Local::now().format("%Y-%m-%d-%H-%M-%S-%3f")
    ))
}
