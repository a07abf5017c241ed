use std::time::Instant;

use uuid::Uuid;

/// Listen/stop state machine. Linear: Idle -> Recording -> Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not currently recording.
    #[default]
    Idle,
    /// The microphone is open and chunks are being appended.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl RecordingState {
    /// True while a session is active.
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }
}
