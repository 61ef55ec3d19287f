use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("MIDI input is not supported on this system")]
    Unsupported,
    #[error("Failed to access MIDI devices: {0}")]
    Access(String),
    #[error("Failed to connect to {device}: {message}")]
    Connect { device: String, message: String },
    #[error("No MIDI device with id {0}")]
    UnknownDevice(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}
