use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Why a recording was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingEnd {
    /// `end_recording` was called.
    Stopped,
    /// A new recording was started on top of it.
    Replaced,
    /// The sink rejected a write.
    WriteFailed,
    /// The engine was reconfigured.
    Reconfigured,
    /// The engine was dropped.
    Dropped,
}

/// Summary of a finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub file_path: PathBuf,
    /// Frames handed to the sink while recording.
    pub frames_written: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
    pub ended_by: RecordingEnd,
    /// Whether the sink closed cleanly and the header was finalized.
    pub finalized: bool,
}

impl RecordingSummary {
    pub fn new(
        file_path: PathBuf,
        frames_written: u64,
        sample_rate: u32,
        channels: u16,
        ended_by: RecordingEnd,
        finalized: bool,
    ) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            frames_written as f64 / sample_rate as f64
        };
        Self {
            file_path,
            frames_written,
            sample_rate,
            channels,
            duration_secs,
            ended_by,
            finalized,
        }
    }
}
