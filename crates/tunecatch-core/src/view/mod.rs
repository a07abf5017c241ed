mod recording_state;
pub(crate) mod song_slot;
mod song_view;

pub use {
    recording_state::RecordingState,
    song_view::{ListenOutcome, SongView, SubmitOutcome, ViewOptions, ViewSnapshot, microphone_notice},
};
