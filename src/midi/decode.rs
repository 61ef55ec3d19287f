use crate::events::{NOTE_ON, NoteEvent};

/// Decodes a raw MIDI message into a note-on.
///
/// Note-offs and zero-velocity note-ons (the usual running-status note-off)
/// yield `None`, as does anything that isn't a complete three byte note-on.
pub fn decode(message: &[u8], timestamp_us: u64) -> Option<NoteEvent> {
    let [status, note, velocity, ..] = *message else {
        return None;
    };

    let command = status >> 4;
    let velocity = velocity & 0x7F;

    if command != NOTE_ON || velocity == 0 {
        return None;
    }

    Some(NoteEvent {
        command,
        channel: status & 0x0F,
        note: note & 0x7F,
        velocity,
        timestamp_us,
    })
}
