use crate::config::DrumProfile;
use crate::events::DrumCategory;
use std::collections::BTreeMap;

/// General MIDI Level 1 percussion, folded onto the eight kit pieces.
/// Most kits are close to this but module presets vary, so profiles can
/// override individual notes.
const GENERAL_MIDI: [(u8, DrumCategory); 21] = [
    (35, DrumCategory::Kick),     // Acoustic Bass Drum
    (36, DrumCategory::Kick),     // Bass Drum 1
    (37, DrumCategory::Snare),    // Side Stick
    (38, DrumCategory::Snare),    // Acoustic Snare
    (40, DrumCategory::Snare),    // Electric Snare
    (41, DrumCategory::FloorTom), // Low Floor Tom
    (43, DrumCategory::FloorTom), // High Floor Tom
    (45, DrumCategory::MidTom),   // Low Tom
    (47, DrumCategory::MidTom),   // Low-Mid Tom
    (48, DrumCategory::HighTom),  // Hi-Mid Tom
    (50, DrumCategory::HighTom),  // High Tom
    (42, DrumCategory::HiHat),    // Closed Hi-Hat
    (44, DrumCategory::HiHat),    // Pedal Hi-Hat
    (46, DrumCategory::HiHat),    // Open Hi-Hat
    (49, DrumCategory::Crash),    // Crash Cymbal 1
    (55, DrumCategory::Crash),    // Splash Cymbal
    (57, DrumCategory::Crash),    // Crash Cymbal 2
    (51, DrumCategory::Ride),     // Ride Cymbal 1
    (52, DrumCategory::Ride),     // Chinese Cymbal
    (53, DrumCategory::Ride),     // Ride Bell
    (59, DrumCategory::Ride),     // Ride Cymbal 2
];

#[derive(Debug, Clone, PartialEq)]
pub struct DrumMap {
    name: String,
    table: [Option<DrumCategory>; 128],
}

impl DrumMap {
    pub fn general_midi() -> Self {
        let mut table = [None; 128];
        for (note, category) in GENERAL_MIDI {
            table[note as usize] = Some(category);
        }
        Self {
            name: "General MIDI".to_string(),
            table,
        }
    }

    pub fn from_profile(profile: &DrumProfile) -> Self {
        let mut map = if profile.replace_defaults {
            Self {
                name: String::new(),
                table: [None; 128],
            }
        } else {
            Self::general_midi()
        };
        map.name = profile.name.clone();
        map.apply(&profile.notes);
        map
    }

    fn apply(&mut self, notes: &BTreeMap<u8, Option<DrumCategory>>) {
        for (&note, &category) in notes {
            if let Some(slot) = self.table.get_mut(note as usize) {
                *slot = category;
            } else {
                tracing::warn!(note, "ignoring out of range note in drum profile");
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self, note: u8) -> Option<DrumCategory> {
        self.table.get(note as usize).copied().flatten()
    }

    #[cfg(test)]
    pub fn notes_for(&self, category: DrumCategory) -> Vec<u8> {
        (0..128u8)
            .filter(|&note| self.category(note) == Some(category))
            .collect()
    }
}

impl Default for DrumMap {
    fn default() -> Self {
        Self::general_midi()
    }
}
