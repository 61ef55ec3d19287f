use crate::bus::NoteBus;
use crate::config::{DrumProfile, Settings};
use crate::error::{ConfigError, InputError};
use crate::events::Device;
use crate::mapping::DrumMap;
use crate::midi::{CLIENT_NAME, InputSession, MidiHost, MidirHost};
use arc_swap::ArcSwap;
use crossbeam::channel::{Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    SelectDevice(String),
    RefreshDevices,
    LoadProfile(PathBuf),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineUpdate {
    Unsupported,
    Devices {
        devices: Vec<Device>,
        selected: Option<String>,
    },
    ProfileLoaded {
        name: String,
    },
    ProfileFailed {
        message: String,
    },
    /// Input error state. `None` once the error has cleared.
    InputError {
        message: Option<String>,
    },
}

pub type SharedDrumMap = Arc<ArcSwap<DrumMap>>;

pub struct EngineHandle {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<EngineUpdate>,
    pub bus: NoteBus,
    pub drum_map: SharedDrumMap,
}

pub fn spawn_engine(settings: &Settings) -> EngineHandle {
    spawn_engine_with(settings.clone(), || MidirHost::probe(CLIENT_NAME))
}

/// Runs the input engine on its own thread. The host is created on that
/// thread so it never has to cross threads.
pub fn spawn_engine_with<H, F>(settings: Settings, probe: F) -> EngineHandle
where
    H: MidiHost + 'static,
    F: FnOnce() -> Result<H, InputError> + Send + 'static,
{
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();
    let bus = NoteBus::new();
    let drum_map: SharedDrumMap = Arc::new(ArcSwap::from_pointee(DrumMap::general_midi()));

    let engine_bus = bus.clone();
    let engine_map = drum_map.clone();
    let (reload_tx, reload_rx) = crossbeam::channel::unbounded();

    std::thread::spawn(move || {
        let session = InputSession::start(probe(), engine_bus, &settings);
        let state = EngineState {
            session,
            drum_map: engine_map,
            reload_tx,
            watcher: None,
            last_devices: None,
            last_error: None,
        };
        engine_thread(state, settings, command_rx, reload_rx, update_tx);
    });

    EngineHandle {
        command_tx,
        update_rx,
        bus,
        drum_map,
    }
}

struct EngineState<H: MidiHost> {
    session: InputSession<H>,
    drum_map: SharedDrumMap,
    reload_tx: Sender<PathBuf>,
    watcher: Option<(PathBuf, RecommendedWatcher)>,
    last_devices: Option<(Vec<Device>, Option<String>)>,
    last_error: Option<String>,
}

fn engine_thread<H: MidiHost>(
    mut state: EngineState<H>,
    settings: Settings,
    command_rx: Receiver<EngineCommand>,
    reload_rx: Receiver<PathBuf>,
    update_tx: Sender<EngineUpdate>,
) {
    if !state.session.is_supported() {
        let _ = update_tx.send(EngineUpdate::Unsupported);
    }

    if let Some(path) = settings.profile.clone() {
        state.load_profile(&path, settings.watch_profile, &update_tx);
    }

    state.report(&update_tx, false);

    loop {
        crossbeam::channel::select! {
            recv(command_rx) -> command => match command {
                Ok(EngineCommand::SelectDevice(id)) => {
                    state.session.select_device(&id);
                    state.report(&update_tx, false);
                }
                Ok(EngineCommand::RefreshDevices) => {
                    state.session.refresh_devices();
                    state.report(&update_tx, true);
                }
                Ok(EngineCommand::LoadProfile(path)) => {
                    state.load_profile(&path, settings.watch_profile, &update_tx);
                }
                // A dropped handle stops the engine the same way.
                Ok(EngineCommand::Shutdown) | Err(_) => {
                    state.session.shutdown();
                    break;
                }
            },
            recv(reload_rx) -> path => {
                if let Ok(path) = path {
                    state.load_profile(&path, settings.watch_profile, &update_tx);
                }
            }
            // midir has no hot-plug notification, so poll.
            default(settings.device_poll()) => {
                state.session.refresh_devices();
                state.report(&update_tx, false);
            }
        }
    }

    tracing::debug!("input engine stopped");
}

impl<H: MidiHost> EngineState<H> {
    /// Sends device and error updates when they changed since the last
    /// report, or unconditionally when `force` is set.
    fn report(&mut self, update_tx: &Sender<EngineUpdate>, force: bool) {
        if !self.session.is_supported() {
            return;
        }

        let current = (
            self.session.devices().to_vec(),
            self.session.selected_device_id().map(str::to_string),
        );
        if force || self.last_devices.as_ref() != Some(&current) {
            let _ = update_tx.send(EngineUpdate::Devices {
                devices: current.0.clone(),
                selected: current.1.clone(),
            });
            self.last_devices = Some(current);
        }

        let error = self.session.error().map(str::to_string);
        if error != self.last_error {
            let _ = update_tx.send(EngineUpdate::InputError {
                message: error.clone(),
            });
            self.last_error = error;
        }
    }

    fn load_profile(&mut self, path: &Path, watch: bool, update_tx: &Sender<EngineUpdate>) {
        let already_watched = matches!(&self.watcher, Some((watched, _)) if watched == path);
        if watch && !already_watched {
            self.watch_profile(path);
        }

        match load_drum_map(path) {
            Ok(map) => {
                tracing::info!(profile = %map.name(), path = %path.display(), "loaded drum profile");
                let name = map.name().to_string();
                self.drum_map.store(Arc::new(map));
                let _ = update_tx.send(EngineUpdate::ProfileLoaded { name });
            }
            Err(e) => {
                tracing::warn!("{}", e);
                let _ = update_tx.send(EngineUpdate::ProfileFailed {
                    message: format!("Failed to load drum profile: {}", e),
                });
            }
        }
    }

    fn watch_profile(&mut self, path: &Path) {
        let tx = self.reload_tx.clone();
        let watched = path.to_path_buf();
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = tx.send(watched.clone());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("profile watch error: {}", e),
            }
        });

        // Replacing the watcher drops the old one, which stops its thread.
        self.watcher = match watcher {
            Ok(mut watcher) => match watcher.watch(path, RecursiveMode::NonRecursive) {
                Ok(()) => Some((path.to_path_buf(), watcher)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "cannot watch drum profile: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("cannot create file watcher: {}", e);
                None
            }
        };
    }
}

pub fn load_drum_map(path: &Path) -> Result<DrumMap, ConfigError> {
    DrumProfile::load(path).map(|profile| DrumMap::from_profile(&profile))
}
