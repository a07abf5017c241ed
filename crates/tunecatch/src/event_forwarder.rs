//! Bridges the blocking crossbeam receivers of `tray-icon` and
//! `global-hotkey` into tokio channels.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

const FORWARDER_CAPACITY: usize = 32;
const FORWARDER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs `recv` on a blocking thread and forwards every event.
///
/// The forwarder ends when `recv` returns `None` or when the returned
/// receiver is dropped and the next send fails.
pub(crate) fn spawn_forwarder<T, F>(recv: F) -> (mpsc::Receiver<T>, JoinHandle<()>)
where
    T: Send + 'static,
    F: Fn() -> Option<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(FORWARDER_CAPACITY);
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(event) = recv() {
            if tx.blocking_send(event).is_err() {
                break;
            }
        }
    });
    (rx, handle)
}

/// Best-effort join. A forwarder parked in a blocking `recv` only notices
/// the closed channel on its next event, so it may outlive this call and be
/// reaped at process exit.
pub(crate) async fn join_forwarder(name: &'static str, handle: JoinHandle<()>) {
    match tokio::time::timeout(FORWARDER_JOIN_TIMEOUT, handle).await {
        Ok(Ok(())) => debug!(forwarder = name, "Event forwarder stopped cleanly"),
        Ok(Err(e)) => warn!(forwarder = name, error = ?e, "Event forwarder task panicked"),
        Err(_) => debug!(forwarder = name, "Event forwarder still blocked, left to process exit"),
    }
}
