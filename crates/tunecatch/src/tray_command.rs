use tunecatch_core::ViewSnapshot;

/// Events posted to the main thread's event loop, which alone may touch
/// the `!Send` tray icon.
#[derive(Debug, Clone)]
pub enum TrayCommand {
    /// Redraw icon, tooltip and menu from a view snapshot.
    Render(ViewSnapshot),
    /// Leave the event loop and exit.
    Shutdown,
}
