use crate::error::ConfigError;
use crate::events::DrumCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "drumsight.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceLostPolicy {
    /// Fall back to the first device still connected.
    #[default]
    ReselectFirst,
    /// Stay disconnected until a device is picked by hand.
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub kit_highlight_ms: u64,
    pub overlay_highlight_ms: u64,
    pub log_limit: usize,
    pub preferred_device: Option<String>,
    pub on_device_lost: DeviceLostPolicy,
    pub device_poll_ms: u64,
    pub profile: Option<PathBuf>,
    pub watch_profile: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kit_highlight_ms: 100,
            overlay_highlight_ms: 200,
            log_limit: 20,
            preferred_device: None,
            on_device_lost: DeviceLostPolicy::ReselectFirst,
            device_poll_ms: 1000,
            profile: None,
            watch_profile: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_ron(path)
    }

    /// Settings from `path`, or from `drumsight.ron` in the working directory
    /// when it exists. Falls back to defaults otherwise.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn kit_highlight(&self) -> Duration {
        Duration::from_millis(self.kit_highlight_ms)
    }

    pub fn overlay_highlight(&self) -> Duration {
        Duration::from_millis(self.overlay_highlight_ms)
    }

    pub fn device_poll(&self) -> Duration {
        Duration::from_millis(self.device_poll_ms.max(50))
    }
}

/// Per-kit note overrides. A `None` category unmaps a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumProfile {
    pub name: String,
    #[serde(default)]
    pub replace_defaults: bool,
    pub notes: BTreeMap<u8, Option<DrumCategory>>,
}

impl DrumProfile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_ron(path)
    }
}

fn read_ron<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let ron_string = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&ron_string).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let settings: Settings = ron::from_str(
            r#"(
                kit_highlight_ms: 150,
                preferred_device: Some("TD-17"),
                on_device_lost: Disconnect,
            )"#,
        )
        .unwrap();

        assert_eq!(settings.kit_highlight(), Duration::from_millis(150));
        assert_eq!(settings.overlay_highlight(), Duration::from_millis(200));
        assert_eq!(settings.preferred_device.as_deref(), Some("TD-17"));
        assert_eq!(settings.on_device_lost, DeviceLostPolicy::Disconnect);
        assert_eq!(settings.log_limit, 20);
    }

    #[test]
    fn parses_profile() {
        let profile: DrumProfile = ron::from_str(
            r#"(
                name: "TD-17",
                notes: {
                    22: Some(HiHat),
                    26: Some(HiHat),
                    58: Some(FloorTom),
                    37: None,
                },
            )"#,
        )
        .unwrap();

        assert_eq!(profile.name, "TD-17");
        assert!(!profile.replace_defaults);
        assert_eq!(profile.notes.get(&58), Some(&Some(DrumCategory::FloorTom)));
        assert_eq!(profile.notes.get(&37), Some(&None));
    }

    #[test]
    fn shipped_files_parse() {
        let settings: Settings = ron::from_str(include_str!("../drumsight.example.ron")).unwrap();
        assert_eq!(settings.profile, Some(PathBuf::from("profiles/td17.ron")));
        assert!(settings.watch_profile);

        let profile: DrumProfile = ron::from_str(include_str!("../profiles/td17.ron")).unwrap();
        assert_eq!(profile.notes.get(&22), Some(&Some(DrumCategory::HiHat)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::load(Path::new("/nonexistent/drumsight.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let settings = Settings {
            device_poll_ms: 0,
            ..Settings::default()
        };
        assert_eq!(settings.device_poll(), Duration::from_millis(50));
    }
}
