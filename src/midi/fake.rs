use super::decode;
use super::host::{Listener, MidiHost, NoteSink};
use crate::error::InputError;
use crate::events::Device;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    devices: Vec<Device>,
    attached: Vec<String>,
    detached: HashMap<String, usize>,
    sinks: HashMap<u64, NoteSink>,
    next_listener: u64,
    connect_attempts: usize,
    fail_connect: bool,
}

/// In-memory host whose ports can be plugged and unplugged from a test.
#[derive(Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHost {
    pub fn with_devices(ids: &[&str]) -> Self {
        let host = Self::default();
        for id in ids {
            host.plug(id);
        }
        host
    }

    pub fn plug(&self, id: &str) {
        self.state.lock().devices.push(Device {
            id: id.to_string(),
            name: format!("{} MIDI 1", id.to_uppercase()),
            manufacturer: None,
        });
    }

    pub fn unplug(&self, id: &str) {
        self.state.lock().devices.retain(|device| device.id != id);
    }

    pub fn fail_connect(&self, fail: bool) {
        self.state.lock().fail_connect = fail;
    }

    /// Delivers a raw message to every attached listener.
    pub fn send(&self, message: &[u8], timestamp_us: u64) {
        let state = self.state.lock();
        if let Some(event) = decode(message, timestamp_us) {
            for sink in state.sinks.values() {
                sink(event);
            }
        }
    }

    pub fn attached(&self) -> Vec<String> {
        self.state.lock().attached.clone()
    }

    pub fn attach_count(&self) -> usize {
        self.state.lock().attached.len()
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.lock().connect_attempts
    }

    pub fn detach_count(&self, id: &str) -> usize {
        self.state.lock().detached.get(id).copied().unwrap_or(0)
    }

    pub fn live_listeners(&self) -> usize {
        self.state.lock().sinks.len()
    }
}

impl MidiHost for FakeHost {
    fn devices(&self) -> Result<Vec<Device>, InputError> {
        Ok(self.state.lock().devices.clone())
    }

    fn connect(
        &mut self,
        device: &Device,
        sink: NoteSink,
    ) -> Result<Box<dyn Listener>, InputError> {
        let mut state = self.state.lock();
        state.connect_attempts += 1;
        if state.fail_connect {
            return Err(InputError::Connect {
                device: device.name.clone(),
                message: "port busy".to_string(),
            });
        }

        let key = state.next_listener;
        state.next_listener += 1;
        state.sinks.insert(key, sink);
        state.attached.push(device.id.clone());

        Ok(Box::new(FakeListener {
            key,
            device_id: device.id.clone(),
            state: self.state.clone(),
        }))
    }
}

struct FakeListener {
    key: u64,
    device_id: String,
    state: Arc<Mutex<FakeState>>,
}

impl Listener for FakeListener {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn detach(self: Box<Self>) {
        let mut state = self.state.lock();
        state.sinks.remove(&self.key);
        *state.detached.entry(self.device_id.clone()).or_default() += 1;
    }
}
