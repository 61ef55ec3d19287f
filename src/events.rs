use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOTE_ON: u8 = 0x9;
pub const NOTE_OFF: u8 = 0x8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub manufacturer: Option<String>,
}

impl Device {
    pub fn label(&self) -> String {
        match &self.manufacturer {
            Some(manufacturer) => format!("{} ({})", self.name, manufacturer),
            None => self.name.clone(),
        }
    }
}

/// A decoded note-on. `velocity` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub command: u8,
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
    pub timestamp_us: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrumCategory {
    Kick,
    Snare,
    HiHat,
    HighTom,
    MidTom,
    FloorTom,
    Crash,
    Ride,
}

impl DrumCategory {
    pub const ALL: [DrumCategory; 8] = [
        DrumCategory::Kick,
        DrumCategory::Snare,
        DrumCategory::HiHat,
        DrumCategory::HighTom,
        DrumCategory::MidTom,
        DrumCategory::FloorTom,
        DrumCategory::Crash,
        DrumCategory::Ride,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrumCategory::Kick => "kick",
            DrumCategory::Snare => "snare",
            DrumCategory::HiHat => "hihat",
            DrumCategory::HighTom => "high-tom",
            DrumCategory::MidTom => "mid-tom",
            DrumCategory::FloorTom => "floor-tom",
            DrumCategory::Crash => "crash",
            DrumCategory::Ride => "ride",
        }
    }
}

impl fmt::Display for DrumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
