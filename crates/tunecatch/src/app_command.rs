/// Commands sent from the hotkey handler and tray menu to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start listening when idle, stop and recognize when listening.
    ToggleListening,
    /// Submit the Spotify link currently on the clipboard.
    AddSongFromClipboard,
    /// Request application shutdown.
    Shutdown,
}
