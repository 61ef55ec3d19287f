use super::host::{Listener, MidiHost, NoteSink};
use crate::bus::NoteBus;
use crate::config::{DeviceLostPolicy, Settings};
use crate::error::InputError;
use crate::events::{Device, NoteEvent};
use parking_lot::Mutex;
use std::sync::Arc;

const ACCESS_FAILED: &str = "Failed to access MIDI devices. Check permissions.";

/// Tracks the available input devices and keeps at most one of them
/// attached, publishing its decoded notes onto a [`NoteBus`].
pub struct InputSession<H: MidiHost> {
    host: Option<H>,
    supported: bool,
    bus: NoteBus,
    devices: Vec<Device>,
    selected: Option<String>,
    listener: Option<Box<dyn Listener>>,
    last_event: Arc<Mutex<Option<NoteEvent>>>,
    error: Option<String>,
    preferred_device: Option<String>,
    on_device_lost: DeviceLostPolicy,
    auto_select: bool,
}

impl<H: MidiHost> InputSession<H> {
    /// Builds a session from the result of the capability probe and does the
    /// first device scan.
    pub fn start(probe: Result<H, InputError>, bus: NoteBus, settings: &Settings) -> Self {
        let mut session = Self {
            host: None,
            supported: true,
            bus,
            devices: Vec::new(),
            selected: None,
            listener: None,
            last_event: Arc::new(Mutex::new(None)),
            error: None,
            preferred_device: settings.preferred_device.clone(),
            on_device_lost: settings.on_device_lost,
            auto_select: true,
        };

        match probe {
            Ok(host) => {
                session.host = Some(host);
                session.refresh_devices();
            }
            Err(InputError::Unsupported) => {
                session.supported = false;
                tracing::info!("MIDI input not supported, input session disabled");
            }
            Err(e) => {
                tracing::warn!("MIDI access failed: {}", e);
                session.error = Some(ACCESS_FAILED.to_string());
            }
        }

        session
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn selected_device_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.listener.is_some()
    }

    pub fn last_event(&self) -> Option<NoteEvent> {
        *self.last_event.lock()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Re-enumerates devices, handles loss of the selected device and
    /// auto-selects when nothing is attached.
    pub fn refresh_devices(&mut self) {
        let Some(host) = self.host.as_ref() else {
            return;
        };

        match host.devices() {
            Ok(devices) => self.devices = devices,
            Err(e) => {
                tracing::warn!("Failed to enumerate MIDI devices: {}", e);
                self.error = Some(e.to_string());
                return;
            }
        }

        if let Some(selected) = self.selected.clone() {
            if !self.devices.iter().any(|device| device.id == selected) {
                tracing::info!(device = %selected, "selected MIDI device disappeared");
                self.detach();
                self.selected = None;
                if self.on_device_lost == DeviceLostPolicy::Disconnect {
                    self.auto_select = false;
                }
            }
        }

        if self.selected.is_none() && self.auto_select {
            if let Some(id) = self.auto_select_candidate() {
                self.attach(&id);
            }
        }
    }

    /// Attaches to `device_id`. Ids not in the current device list are
    /// ignored, as is re-selecting the attached device.
    pub fn select_device(&mut self, device_id: &str) {
        if self.host.is_none() {
            return;
        }
        if !self.devices.iter().any(|device| device.id == device_id) {
            tracing::debug!(device = %device_id, "ignoring selection of unknown device");
            return;
        }
        if self.selected.as_deref() == Some(device_id) && self.listener.is_some() {
            return;
        }

        self.auto_select = true;
        self.attach(device_id);
    }

    /// Detaches the current listener. The device list is kept.
    pub fn shutdown(&mut self) {
        self.detach();
        self.selected = None;
        self.auto_select = false;
    }

    fn auto_select_candidate(&self) -> Option<String> {
        let preferred = self.preferred_device.as_deref().and_then(|wanted| {
            self.devices
                .iter()
                .find(|device| device.name.contains(wanted))
        });
        preferred
            .or_else(|| self.devices.first())
            .map(|device| device.id.clone())
    }

    fn attach(&mut self, device_id: &str) {
        self.detach();

        let Some(device) = self
            .devices
            .iter()
            .find(|device| device.id == device_id)
            .cloned()
        else {
            return;
        };
        let Some(host) = self.host.as_mut() else {
            return;
        };

        let bus = self.bus.clone();
        let last_event = self.last_event.clone();
        let sink: NoteSink = Box::new(move |event| {
            *last_event.lock() = Some(event);
            bus.publish(event);
        });

        match host.connect(&device, sink) {
            Ok(listener) => {
                tracing::info!(device = %device.name, "attached MIDI input");
                self.listener = Some(listener);
                self.selected = Some(device.id);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.selected = None;
                self.auto_select = false;
                self.error = Some(e.to_string());
            }
        }
    }

    fn detach(&mut self) {
        if let Some(listener) = self.listener.take() {
            tracing::info!(device = %listener.device_id(), "detached MIDI input");
            listener.detach();
        }
    }
}

impl<H: MidiHost> Drop for InputSession<H> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::fake::FakeHost;

    fn session_with(host: &FakeHost, settings: &Settings) -> InputSession<FakeHost> {
        InputSession::start(Ok(host.clone()), NoteBus::new(), settings)
    }

    #[test]
    fn auto_selects_first_device() {
        let host = FakeHost::with_devices(&["td17", "pads"]);
        let session = session_with(&host, &Settings::default());

        assert_eq!(session.selected_device_id(), Some("td17"));
        assert!(session.is_connected());
        assert_eq!(host.attached(), vec!["td17".to_string()]);
    }

    #[test]
    fn prefers_configured_device_name() {
        let host = FakeHost::with_devices(&["pads", "td17"]);
        let settings = Settings {
            preferred_device: Some("TD17".to_string()),
            ..Settings::default()
        };
        let session = session_with(&host, &settings);
        assert_eq!(session.selected_device_id(), Some("td17"));
    }

    #[test]
    fn unknown_selection_is_ignored() {
        let host = FakeHost::with_devices(&["td17"]);
        let mut session = session_with(&host, &Settings::default());

        session.select_device("nope");

        assert_eq!(session.selected_device_id(), Some("td17"));
        assert_eq!(host.attach_count(), 1);
        assert_eq!(host.detach_count("td17"), 0);
        assert!(session.error().is_none());
    }

    #[test]
    fn reselecting_current_device_is_a_noop() {
        let host = FakeHost::with_devices(&["td17"]);
        let mut session = session_with(&host, &Settings::default());
        session.select_device("td17");
        assert_eq!(host.attach_count(), 1);
        assert_eq!(host.detach_count("td17"), 0);
    }

    #[test]
    fn switching_detaches_previous_listener_once() {
        let host = FakeHost::with_devices(&["td17", "pads"]);
        let mut session = session_with(&host, &Settings::default());

        session.select_device("pads");
        session.select_device("td17");

        assert_eq!(host.detach_count("td17"), 1);
        assert_eq!(host.detach_count("pads"), 1);
        assert_eq!(host.live_listeners(), 1);
        assert_eq!(session.selected_device_id(), Some("td17"));
    }

    #[test]
    fn events_reach_bus_and_last_event() {
        let host = FakeHost::with_devices(&["td17"]);
        let bus = NoteBus::new();
        let rx = bus.subscribe();
        let session = InputSession::start(Ok(host.clone()), bus, &Settings::default());

        host.send(&[0x99, 36, 80], 10);
        host.send(&[0x99, 42, 0], 20);
        host.send(&[0x89, 38, 64], 30);

        let event = session.last_event().unwrap();
        assert_eq!((event.command, event.note, event.velocity), (9, 36, 80));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn unsupported_never_lists_or_attaches() {
        let host = FakeHost::with_devices(&["td17"]);
        let mut session: InputSession<FakeHost> =
            InputSession::start(Err(InputError::Unsupported), NoteBus::new(), &Settings::default());

        session.refresh_devices();
        session.select_device("td17");

        assert!(!session.is_supported());
        assert!(session.devices().is_empty());
        assert!(!session.is_connected());
        assert!(session.error().is_none());
        assert_eq!(host.attach_count(), 0);
    }

    #[test]
    fn access_failure_reports_error() {
        let session: InputSession<FakeHost> = InputSession::start(
            Err(InputError::Access("denied".to_string())),
            NoteBus::new(),
            &Settings::default(),
        );
        assert!(session.is_supported());
        assert_eq!(session.error(), Some(ACCESS_FAILED));
        assert!(session.devices().is_empty());
    }

    #[test]
    fn lost_device_reselects_first_remaining() {
        let host = FakeHost::with_devices(&["td17", "pads"]);
        let mut session = session_with(&host, &Settings::default());

        host.unplug("td17");
        session.refresh_devices();

        assert_eq!(host.detach_count("td17"), 1);
        assert_eq!(session.selected_device_id(), Some("pads"));
        assert!(session.is_connected());
    }

    #[test]
    fn lost_device_stays_disconnected_when_configured() {
        let host = FakeHost::with_devices(&["td17", "pads"]);
        let settings = Settings {
            on_device_lost: DeviceLostPolicy::Disconnect,
            ..Settings::default()
        };
        let mut session = session_with(&host, &settings);

        host.unplug("td17");
        session.refresh_devices();
        session.refresh_devices();

        assert_eq!(session.selected_device_id(), None);
        assert!(!session.is_connected());

        session.select_device("pads");
        assert_eq!(session.selected_device_id(), Some("pads"));
    }

    #[test]
    fn hot_plug_attaches_when_idle() {
        let host = FakeHost::with_devices(&[]);
        let mut session = session_with(&host, &Settings::default());
        assert_eq!(session.selected_device_id(), None);

        host.plug("td17");
        session.refresh_devices();

        assert_eq!(session.devices().len(), 1);
        assert_eq!(session.selected_device_id(), Some("td17"));
    }

    #[test]
    fn connect_failure_is_not_retried() {
        let host = FakeHost::with_devices(&["td17"]);
        host.fail_connect(true);
        let mut session = session_with(&host, &Settings::default());

        assert!(session.error().is_some());
        session.refresh_devices();
        assert_eq!(host.connect_attempts(), 1);
        assert!(!session.is_connected());
    }

    #[test]
    fn shutdown_detaches() {
        let host = FakeHost::with_devices(&["td17"]);
        let mut session = session_with(&host, &Settings::default());
        session.shutdown();
        drop(session);
        assert_eq!(host.detach_count("td17"), 1);
        assert_eq!(host.live_listeners(), 0);
    }
}
