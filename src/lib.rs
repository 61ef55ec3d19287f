pub mod bus;
pub mod config;
mod engine;
pub mod error;
pub mod events;
pub mod hits;
pub mod mapping;
pub mod midi;
mod ui;

pub use bus::NoteBus;
pub use config::{DeviceLostPolicy, DrumProfile, Settings};
pub use engine::{
    EngineCommand, EngineHandle, EngineUpdate, SharedDrumMap, load_drum_map, spawn_engine,
    spawn_engine_with,
};
pub use error::{ConfigError, InputError};
pub use events::{Device, DrumCategory, NoteEvent};
pub use hits::{ActiveHits, HitMarker};
pub use mapping::DrumMap;
pub use ui::DrumsightApp;
