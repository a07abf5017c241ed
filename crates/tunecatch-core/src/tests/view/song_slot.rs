use crate::{tests::support::song, view::song_slot::SongSlot};

/// WHAT: Results applied in ticket order replace the song
/// WHY: The newest request's result is what the card shows
#[test]
fn given_tickets_in_order_when_applying_then_each_replaces_song() {
    let mut slot = SongSlot::default();
    let first = slot.ticket();
    let second = slot.ticket();

    assert!(slot.apply(first, song("A", "B", "u")));
    assert!(slot.apply(second, song("C", "D", "v")));

    assert_eq!(slot.current(), Some(&song("C", "D", "v")));
}

/// WHAT: An older ticket arriving after a newer one is dropped
/// WHY: Out-of-order responses must not overwrite a newer song
#[test]
fn given_newer_result_applied_when_older_arrives_then_older_dropped() {
    // Given: Two requests, the newer one answered first
    let mut slot = SongSlot::default();
    let older = slot.ticket();
    let newer = slot.ticket();
    assert!(slot.apply(newer, song("New", "N", "n")));

    // When: The older response lands
    let applied = slot.apply(older, song("Old", "O", "o"));

    // Then: It is ignored
    assert!(!applied);
    assert_eq!(slot.current(), Some(&song("New", "N", "n")));
}

/// WHAT: A ticket that never produced a song does not block later ones
/// WHY: No-match and failed requests leave the slot open to newer results
#[test]
fn given_unused_ticket_when_later_ticket_applies_then_accepted() {
    let mut slot = SongSlot::default();
    let _no_match = slot.ticket();
    let later = slot.ticket();

    assert!(slot.apply(later, song("A", "B", "u")));
    assert!(slot.current().is_some());
}
