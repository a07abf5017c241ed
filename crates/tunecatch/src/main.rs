//! Tunecatch: tray client for a song-recognition backend.

mod app;
mod app_command;
mod clipboard_input;
mod config;
mod error;
mod event_forwarder;
mod hotkey_handler;
mod notifier;
mod tray_command;
mod tray_icon_state;
mod tray_manager;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    clipboard_input::ClipboardInput,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    notifier::DesktopNotifier,
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::{MenuIds, TrayManager},
};

use crate::config::Config;

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tunecatch_core::{
    BackendClient, MicrophoneCapturer, RECOGNITION_SAMPLE_RATE, SongView, ViewOptions,
};

/// The view model as wired up by the binary.
pub(crate) type TunecatchView = SongView<MicrophoneCapturer, BackendClient, DesktopNotifier>;

const DEFAULT_LOG_FILTER: &str = "tunecatch=debug,tunecatch_core=debug";

const COMMAND_CAPACITY: usize = 32;

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayIcon is !Send, so the manager never leaves the main thread.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!(error = ?e, "Could not build the tray icon");
            std::process::exit(1);
        }
    };

    // Unregisters the hotkey when dropped.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(TrayCommand::Render(snapshot)) => {
                if let Err(e) = tray_manager.render(&snapshot) {
                    error!(error = ?e, "Tray render failed");
                }
            }
            Event::UserEvent(TrayCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
            }
            Event::NewEvents(StartCause::Init) => {
                match start(tray_proxy.clone(), tray_manager.menu_ids().clone()) {
                    Ok(manager) => hotkey_manager = Some(manager),
                    Err(e) => {
                        error!(error = ?e, "Tunecatch failed to start");
                        std::process::exit(1);
                    }
                }
            }
            _ => {}
        }

        let _ = &hotkey_manager;
    });
}

/// Wire config, backend, view model and hotkey together, then hand the
/// async half to a runtime thread.
///
/// Runs on the main thread: tao pumps the messages global hotkeys need, so
/// the returned manager has to stay here.
fn start(
    tray_proxy: EventLoopProxy<TrayCommand>,
    menu_ids: MenuIds,
) -> AppResult<GlobalHotKeyManager> {
    let config = Config::load()?;
    let base_url = config.validate()?;
    let backend = BackendClient::new(&base_url, config.backend.timeout())?;
    let last_recording_path = config.last_recording_path()?;
    let clipboard = Arc::new(Mutex::new(ClipboardInput::new()?));

    let view = Arc::new(SongView::new(
        MicrophoneCapturer::new(config.audio.max_recording_secs),
        backend,
        DesktopNotifier::new(),
        ViewOptions {
            show_added_song: config.behavior.show_added_song,
            upload_sample_rate: Some(RECOGNITION_SAMPLE_RATE),
            last_recording_path: last_recording_path.clone(),
        },
    ));

    #[cfg(target_os = "macos")]
    unsafe {
        use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
        CFRunLoopWakeUp(CFRunLoopGetMain());
    }

    let (manager, hotkey_id) = HotkeyHandler::register_hotkey()?;
    let runtime = tokio::runtime::Runtime::new()?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let hotkey_handler = HotkeyHandler::new(hotkey_id, command_tx.clone());
    let app = App {
        view,
        clipboard,
        tray_proxy,
        last_recording_path,
        command_tx,
        command_rx,
        shutdown_tx,
        menu_ids,
    };

    std::thread::spawn(move || {
        runtime.block_on(async {
            let hotkeys = async {
                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                    error!(error = ?e, "Hotkey handler stopped with an error");
                }
            };
            let app_loop = async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App loop stopped with an error");
                }
            };
            tokio::join!(hotkeys, app_loop);
        });
    });

    info!(base_url = %base_url, "Tunecatch ready");

    Ok(manager)
}
