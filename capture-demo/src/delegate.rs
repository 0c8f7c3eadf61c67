use mic_capture_core::{CaptureDelegate, CaptureError, CaptureState, RecordingSummary};

/// CaptureDelegate that forwards engine events to the log.
pub struct LogDelegate;

impl CaptureDelegate for LogDelegate {
    fn on_state_changed(&self, state: CaptureState) {
        log::info!("State: {}", state);
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("{}", error);
    }

    fn on_recording_finished(&self, summary: &RecordingSummary) {
        log::info!(
            "Finished {} ({} frames, {:.2}s, {:?})",
            summary.file_path.display(),
            summary.frames_written,
            summary.duration_secs,
            summary.ended_by
        );
    }
}
