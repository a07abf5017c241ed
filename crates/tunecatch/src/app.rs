use crate::{
    AppCommand, AppError, AppResult, ClipboardInput, MenuIds, TrayCommand, TunecatchView,
    event_forwarder::{join_forwarder, spawn_forwarder},
};

use std::{panic::Location, path::PathBuf, sync::Arc};

use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;
use tunecatch_core::{AudioError, ListenOutcome, SubmitOutcome, ViewSnapshot};

/// Main application state.
///
/// Runs on the async runtime thread. Tray updates go back to the main
/// thread through `tray_proxy` because `TrayIcon` is `!Send` and must
/// remain on the UI thread.
pub struct App {
    pub(crate) view: Arc<TunecatchView>,
    pub(crate) clipboard: Arc<Mutex<ClipboardInput>>,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) last_recording_path: Option<PathBuf>,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu_ids: MenuIds,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Tunecatch starting");

        let receiver = MenuEvent::receiver();
        let (mut tray_events, forwarder) = spawn_forwarder(move || receiver.recv().ok());

        loop {
            tokio::select! {
                Some(event) = tray_events.recv() => {
                    if let Err(e) = self.handle_tray_event(event).await {
                        error!(error = ?e, "Failed to handle tray event");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::ToggleListening => self.toggle_listening().await,
                        AppCommand::AddSongFromClipboard => self.add_song_from_clipboard().await,
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_events);

        // Releases the microphone and turns in-flight responses into no-ops.
        self.view.shutdown().await;
        join_forwarder("tray", forwarder).await;

        let _ = self.shutdown_tx.send(true);
        let _ = self.tray_proxy.send_event(TrayCommand::Shutdown);
        info!("Tunecatch shut down successfully");

        Ok(())
    }

    /// Start listening when idle; otherwise stop and recognize in the
    /// background so the loop stays responsive.
    #[instrument(skip(self))]
    async fn toggle_listening(&self) {
        if !self.view.is_recording().await {
            match self.view.start_listening().await {
                Ok(session_id) => debug!(session_id = %session_id, "Listening started"),
                Err(e) => match e.as_audio() {
                    Some(AudioError::AlreadyRecording { .. }) => {
                        debug!("Start raced with another start")
                    }
                    _ => warn!(error = ?e, "Could not start listening"),
                },
            }
            send_render(&self.tray_proxy, self.view.snapshot().await);
            return;
        }

        let mut pending = self.view.snapshot().await;
        pending.recording = false;
        pending.recognizing = true;
        send_render(&self.tray_proxy, pending);

        let view = Arc::clone(&self.view);
        let tray_proxy = self.tray_proxy.clone();
        tokio::spawn(async move {
            match view.stop_listening().await {
                Ok(outcome) => log_listen_outcome(&outcome),
                Err(e) => warn!(error = ?e, "Could not stop listening"),
            }
            let snapshot = view.snapshot().await;
            send_render(&tray_proxy, snapshot);
        });
    }

    /// Read the clipboard and submit it in the background.
    #[instrument(skip(self))]
    async fn add_song_from_clipboard(&self) {
        let link = {
            let mut clipboard = self.clipboard.lock().await;
            match clipboard.read_link() {
                Ok(link) => link,
                Err(e) => {
                    error!(error = ?e, "Failed to read clipboard");
                    String::new()
                }
            }
        };

        let mut pending = self.view.snapshot().await;
        pending.submitting = !link.trim().is_empty();
        send_render(&self.tray_proxy, pending);

        let view = Arc::clone(&self.view);
        let tray_proxy = self.tray_proxy.clone();
        tokio::spawn(async move {
            match view.submit_link(&link).await {
                SubmitOutcome::Added(added) => info!(
                    id = ?added.id,
                    youtube_url = ?added.youtube_url,
                    title = %added.meta.title,
                    "Song added"
                ),
                other => debug!(outcome = ?other, "Submission finished"),
            }
            let snapshot = view.snapshot().await;
            send_render(&tray_proxy, snapshot);
        });
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_tray_event(&mut self, event: MenuEvent) -> AppResult<()> {
        let event_id = &event.id;

        let command = if *event_id == self.menu_ids.listen {
            AppCommand::ToggleListening
        } else if *event_id == self.menu_ids.add_song {
            AppCommand::AddSongFromClipboard
        } else if *event_id == self.menu_ids.open_cover {
            self.open_album_cover();
            return Ok(());
        } else if *event_id == self.menu_ids.open_recording {
            self.open_last_recording();
            return Ok(());
        } else if *event_id == self.menu_ids.exit {
            info!("Exit requested from tray menu");
            AppCommand::Shutdown
        } else {
            return Ok(());
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    fn open_album_cover(&self) {
        let Some(song) = self.view.current_song() else {
            debug!("No song to open a cover for");
            return;
        };
        if !crate::tray_manager::has_cover(&song) {
            debug!(title = %song.title, "Current song has no album cover");
            return;
        }
        match open::that(&song.album_cover) {
            Ok(()) => info!(url = %song.album_cover, "Opened album cover"),
            Err(e) => warn!(url = %song.album_cover, error = ?e, "Failed to open album cover"),
        }
    }

    fn open_last_recording(&self) {
        let Some(path) = self.last_recording_path.as_deref().filter(|p| p.exists()) else {
            debug!("No saved recording to open");
            return;
        };
        match open::that(path) {
            Ok(()) => info!(path = ?path, "Opened last recording"),
            Err(e) => warn!(path = ?path, error = ?e, "Failed to open last recording"),
        }
    }
}

fn send_render(tray_proxy: &EventLoopProxy<TrayCommand>, snapshot: ViewSnapshot) {
    if tray_proxy.send_event(TrayCommand::Render(snapshot)).is_err() {
        debug!("Event loop closed, dropping tray update");
    }
}

fn log_listen_outcome(outcome: &ListenOutcome) {
    match outcome {
        ListenOutcome::Matched(song) => {
            info!(title = %song.title, artist = %song.artist, "Match shown")
        }
        ListenOutcome::Superseded(song) => {
            debug!(title = %song.title, "Match superseded by a newer result")
        }
        other => debug!(outcome = ?other, "Listening finished"),
    }
}
