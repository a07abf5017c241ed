//! Clipboard as the link input field.
//!
//! "Add Song from Clipboard" reads whatever text is on the clipboard and
//! hands it to the view model unchanged; trimming and blank-input validation
//! happen there.

use crate::{AppError, AppResult};

use std::panic::Location;

use arboard::Clipboard;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Reads Spotify links from the system clipboard.
pub struct ClipboardInput {
    pub(crate) clipboard: Clipboard,
}

impl ClipboardInput {
    /// Open the system clipboard.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
            reason: format!("cannot open clipboard: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("Clipboard opened");

        Ok(Self { clipboard })
    }

    /// Current clipboard text. An empty or non-text clipboard reads as an
    /// empty string so it goes through the normal blank-input path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn read_link(&mut self) -> AppResult<String> {
        match self.clipboard.get_text() {
            Ok(text) => {
                debug!(text_len = text.len(), "Read clipboard text");
                Ok(text)
            }
            Err(arboard::Error::ContentNotAvailable) => {
                debug!("Clipboard holds no text");
                Ok(String::new())
            }
            Err(e) => Err(AppError::ClipboardError {
                reason: format!("cannot read clipboard text: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
