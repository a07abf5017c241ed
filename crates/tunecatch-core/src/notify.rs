/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// An action completed (song uploaded, match found).
    Success,
    /// Neutral information.
    Info,
    /// Validation, microphone or backend failure.
    Error,
}

/// Toast/alert capability used by the flows in [`crate::SongView`].
///
/// Implementations own rendering and timing and must not block.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user.
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Generic failure notice for backend and transport errors.
pub const GENERIC_FAILURE: &str = "Something went wrong.";
/// Validation notice for a blank link.
pub const EMPTY_LINK: &str = "Please enter a Spotify track link.";
/// Notice when a session stops without any audio.
pub const NO_AUDIO: &str = "No audio captured.";
