use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingSummary;
use crate::models::state::CaptureState;

/// Event delegate for capture engine notifications.
///
/// Methods may be called from the application thread or from the audio
/// thread (write failures, empty buffers). Implementations must be cheap
/// and must not call back into the engine.
pub trait CaptureDelegate: Send + Sync {
    /// Called after every state transition.
    fn on_state_changed(&self, state: CaptureState);

    /// Called for every reported failure.
    fn on_error(&self, error: &CaptureError);

    /// Called when a recording file has been closed.
    fn on_recording_finished(&self, summary: &RecordingSummary);
}
