//! Global toggle shortcut. Presses become commands for the app loop; the
//! recording state itself lives in the view model.

use crate::{
    AppCommand, AppError, AppResult,
    event_forwarder::{join_forwarder, spawn_forwarder},
};

use std::panic::Location;

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

/// Shortcut that starts and stops listening.
pub(crate) const TOGGLE_HOTKEY: &str = "CTRL+SHIFT+Space";

/// Turns hotkey presses into [`AppCommand::ToggleListening`].
pub struct HotkeyHandler {
    hotkey_id: u32,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Claim [`TOGGLE_HOTKEY`] and return the manager with the hotkey id.
    ///
    /// Call on the thread that runs the `tao` event loop; on Windows the
    /// hotkey is delivered as a window message that loop pumps. Dropping
    /// the manager releases the hotkey.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey() -> AppResult<(GlobalHotKeyManager, u32)> {
        let hotkey = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::Space);

        let manager = GlobalHotKeyManager::new()
            .map_err(|e| registration_error(format!("no hotkey manager: {e}")))?;
        manager
            .register(hotkey)
            .map_err(|e| registration_error(format!("{TOGGLE_HOTKEY} is taken: {e}")))?;

        info!(hotkey = TOGGLE_HOTKEY, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Listen for presses of `hotkey_id` and send toggles on `command_tx`.
    pub fn new(hotkey_id: u32, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            hotkey_id,
            command_tx,
        }
    }

    /// Relay presses until the shutdown signal flips.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver();
        let (mut events, forwarder) = spawn_forwarder(move || receiver.recv().ok());

        let result = loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break Ok(());
                }
                Some(event) = events.recv() => {
                    if !self.is_toggle(&event) {
                        continue;
                    }
                    if let Err(e) = self.handle_hotkey_press().await {
                        break Err(e);
                    }
                }
                else => break Ok(()),
            }
        };

        drop(events);
        join_forwarder("hotkey", forwarder).await;

        result
    }

    /// True for a press (not a release) of our hotkey.
    pub(crate) fn is_toggle(&self, event: &GlobalHotKeyEvent) -> bool {
        event.id == self.hotkey_id && event.state == HotKeyState::Pressed
    }

    #[instrument(skip(self))]
    pub(crate) async fn handle_hotkey_press(&self) -> AppResult<()> {
        self.command_tx
            .send(AppCommand::ToggleListening)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("toggle from hotkey dropped: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Toggle queued from hotkey");

        Ok(())
    }
}

#[track_caller]
fn registration_error(reason: String) -> AppError {
    AppError::HotkeyRegistrationFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
