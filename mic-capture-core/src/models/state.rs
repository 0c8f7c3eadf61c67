use serde::{Deserialize, Serialize};

/// Recording state machine.
///
/// State transitions:
/// ```text
/// uninitialized → ready ⇄ recording
///       ↑           │
///       └───────────┘  (reconfigure / configuration failure)
/// ```
///
/// `Recording` holds exactly when a sink is open on a recording target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    #[default]
    Uninitialized,
    Ready,
    Recording,
}

impl CaptureState {
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Recording => "recording",
        }
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
