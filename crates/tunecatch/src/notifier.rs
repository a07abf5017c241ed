//! Desktop notifications for flow results.

use notify_rust::{Notification, Timeout};
use tracing::{debug, warn};
use tunecatch_core::{NoticeKind, Notifier};

const APP_NAME: &str = "Tunecatch";

const NOTICE_TIMEOUT_MS: u32 = 5_000;

/// [`Notifier`] backed by the platform notification centre.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    /// Create a notifier.
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        let result = Notification::new()
            .appname(APP_NAME)
            .summary(summary_for(kind))
            .body(message)
            .timeout(Timeout::Milliseconds(NOTICE_TIMEOUT_MS))
            .show();

        // A missing notification daemon must not fail the flow that reported.
        match result {
            Ok(_) => debug!(?kind, body = message, "Notification shown"),
            Err(e) => warn!(?kind, body = message, error = ?e, "Failed to show notification"),
        }
    }
}

/// Notification title for a notice kind.
pub(crate) fn summary_for(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success | NoticeKind::Info => APP_NAME,
        NoticeKind::Error => "Tunecatch - Error",
    }
}
