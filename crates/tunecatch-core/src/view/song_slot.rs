use crate::Song;

/// Monotonic id handed to a request that may write the song slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Ticket(u64);

/// The single displayed-song slot shared by both flows.
///
/// Results are applied in ticket order: a result whose ticket is not newer
/// than the last applied one is stale and dropped.
#[derive(Debug, Default)]
pub(crate) struct SongSlot {
    song: Option<Song>,
    issued: u64,
    applied: u64,
}

impl SongSlot {
    pub(crate) fn ticket(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Replaces the song if `ticket` is newer than the last applied one.
    pub(crate) fn apply(&mut self, ticket: Ticket, song: Song) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        self.song = Some(song);
        true
    }

    pub(crate) fn current(&self) -> Option<&Song> {
        self.song.as_ref()
    }
}
