//! System tray icon with snapshot-driven updates.
//!
//! The tray is the client's single view: the menu carries the controls, the
//! tooltip carries the status line and the song card, and the icon colour
//! follows the [`TrayIconState`].

use crate::{AppError, AppResult, TrayIconState};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use tunecatch_core::{Song, ViewSnapshot};

const ICON_SIZE: u32 = 32;

/// Menu item ids the async side dispatches on.
#[derive(Debug, Clone)]
pub struct MenuIds {
    /// Listen / Stop Listening toggle.
    pub listen: MenuId,
    /// Submit the clipboard's Spotify link.
    pub add_song: MenuId,
    /// Open the current song's album cover.
    pub open_cover: MenuId,
    /// Open the most recent uploaded recording.
    pub open_recording: MenuId,
    /// Quit.
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    listen_item: MenuItem,
    add_song_item: MenuItem,
    open_cover_item: MenuItem,
    state: TrayIconState,
    menu_ids: MenuIds,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let listen_item = MenuItem::new(listen_label(false), true, None);
        let add_song_item = MenuItem::new(add_song_label(false), true, None);
        let open_cover_item = MenuItem::new("Open Album Cover", false, None);
        let open_recording_item = MenuItem::new("Open Last Recording", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let menu_ids = MenuIds {
            listen: listen_item.id().clone(),
            add_song: add_song_item.id().clone(),
            open_cover: open_cover_item.id().clone(),
            open_recording: open_recording_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        let separator = PredefinedMenuItem::separator();
        menu.append_items(&[
            &listen_item,
            &add_song_item,
            &separator,
            &open_cover_item,
            &open_recording_item,
            &separator,
            &exit_item,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = Self::draw_icon(TrayIconState::Idle)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(tooltip_text(TrayIconState::Idle, None))
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            listen_item,
            add_song_item,
            open_cover_item,
            state: TrayIconState::Idle,
            menu_ids,
        })
    }

    /// Redraw the tray from a view snapshot.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn render(&mut self, snapshot: &ViewSnapshot) -> AppResult<()> {
        let state = TrayIconState::from(snapshot);

        if state != self.state {
            self.tray_icon
                .set_icon(Some(Self::draw_icon(state)?))
                .map_err(|e| AppError::TrayError {
                    reason: format!("Failed to update icon: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            debug!(from = ?self.state, to = ?state, "Tray state changed");
            self.state = state;
        }

        self.tray_icon
            .set_tooltip(Some(tooltip_text(state, snapshot.song.as_ref())))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.listen_item.set_text(listen_label(snapshot.recording));
        self.add_song_item.set_text(add_song_label(snapshot.submitting));
        self.add_song_item.set_enabled(!snapshot.submitting);
        self.open_cover_item
            .set_enabled(snapshot.song.as_ref().is_some_and(has_cover));

        Ok(())
    }

    /// Draw a filled disc in the state's colour.
    #[track_caller]
    fn draw_icon(state: TrayIconState) -> AppResult<Icon> {
        let fill = icon_colour(state);
        let centre = (ICON_SIZE as f32 - 1.0) / 2.0;
        let radius = ICON_SIZE as f32 / 2.0 - 2.0;

        let rgba = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
            let (dx, dy) = (x as f32 - centre, y as f32 - centre);
            if dx * dx + dy * dy <= radius * radius {
                fill
            } else {
                Rgba([0, 0, 0, 0])
            }
        });

        Icon::from_rgba(rgba.into_raw(), ICON_SIZE, ICON_SIZE).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Get the menu item ids.
    pub fn menu_ids(&self) -> &MenuIds {
        &self.menu_ids
    }
}

/// Label for the listen toggle.
pub(crate) fn listen_label(recording: bool) -> &'static str {
    if recording { "Stop Listening" } else { "Listen" }
}

/// Label for the add-song item; doubles as its loading indicator.
pub(crate) fn add_song_label(submitting: bool) -> &'static str {
    if submitting {
        "Adding Song..."
    } else {
        "Add Song from Clipboard"
    }
}

/// Tooltip: status line, then the song card when there is one.
pub(crate) fn tooltip_text(state: TrayIconState, song: Option<&Song>) -> String {
    match song {
        Some(song) => format!(
            "Tunecatch - {}\nTitle: {}\nArtist: {}",
            state.label(),
            song.title,
            song.artist
        ),
        None => format!("Tunecatch - {}", state.label()),
    }
}

pub(crate) fn has_cover(song: &Song) -> bool {
    !song.album_cover.trim().is_empty()
}

fn icon_colour(state: TrayIconState) -> Rgba<u8> {
    match state {
        TrayIconState::Idle => Rgba([120, 120, 120, 255]),
        TrayIconState::Listening => Rgba([220, 40, 40, 255]),
        TrayIconState::Recognizing => Rgba([235, 160, 20, 255]),
        TrayIconState::Submitting => Rgba([40, 110, 220, 255]),
    }
}
