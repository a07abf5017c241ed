use tunecatch_core::ViewSnapshot;

/// Tray icon states corresponding to application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready to listen.
    Idle,
    /// Microphone open, recording.
    Listening,
    /// Recording uploaded, waiting for a match.
    Recognizing,
    /// Spotify link submitted, waiting for the backend.
    Submitting,
}

impl TrayIconState {
    /// Tooltip status line.
    pub fn label(self) -> &'static str {
        match self {
            TrayIconState::Idle => "Ready",
            TrayIconState::Listening => "Listening...",
            TrayIconState::Recognizing => "Recognizing...",
            TrayIconState::Submitting => "Adding song...",
        }
    }
}

impl From<&ViewSnapshot> for TrayIconState {
    fn from(snapshot: &ViewSnapshot) -> Self {
        if snapshot.recording {
            TrayIconState::Listening
        } else if snapshot.recognizing {
            TrayIconState::Recognizing
        } else if snapshot.submitting {
            TrayIconState::Submitting
        } else {
            TrayIconState::Idle
        }
    }
}
