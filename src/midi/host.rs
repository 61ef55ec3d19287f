use super::decode;
use crate::error::InputError;
use crate::events::{Device, NoteEvent};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};

pub type NoteSink = Box<dyn Fn(NoteEvent) + Send + 'static>;

/// An attached per-device callback.
pub trait Listener {
    fn device_id(&self) -> &str;

    /// Stops message delivery for this device.
    fn detach(self: Box<Self>);
}

pub trait MidiHost {
    fn devices(&self) -> Result<Vec<Device>, InputError>;

    fn connect(&mut self, device: &Device, sink: NoteSink)
    -> Result<Box<dyn Listener>, InputError>;
}

pub struct MidirHost {
    client_name: String,
    input: MidiInput,
}

impl MidirHost {
    /// Fails with [`InputError::Unsupported`] when the platform has no MIDI
    /// input backend (no ALSA sequencer, no CoreMIDI client, ...).
    pub fn probe(client_name: &str) -> Result<Self, InputError> {
        let mut input = MidiInput::new(client_name).map_err(|e| {
            tracing::warn!("MIDI input unavailable: {}", e);
            InputError::Unsupported
        })?;
        input.ignore(Ignore::All);

        Ok(Self {
            client_name: client_name.to_string(),
            input,
        })
    }

    fn find_port(input: &MidiInput, device_id: &str) -> Option<MidiInputPort> {
        input.ports().into_iter().find(|port| port.id() == device_id)
    }
}

impl MidiHost for MidirHost {
    fn devices(&self) -> Result<Vec<Device>, InputError> {
        Ok(self
            .input
            .ports()
            .iter()
            .map(|port| Device {
                id: port.id(),
                name: self
                    .input
                    .port_name(port)
                    .ok()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "Unknown Device".to_string()),
                manufacturer: None,
            })
            .collect())
    }

    fn connect(
        &mut self,
        device: &Device,
        sink: NoteSink,
    ) -> Result<Box<dyn Listener>, InputError> {
        // `connect` consumes the client, so each connection gets its own.
        let mut input = MidiInput::new(&self.client_name)
            .map_err(|e| InputError::Access(e.to_string()))?;
        input.ignore(Ignore::All);

        let port = Self::find_port(&input, &device.id)
            .ok_or_else(|| InputError::UnknownDevice(device.id.clone()))?;

        let connection = input
            .connect(
                &port,
                &format!("{}-input", self.client_name),
                move |timestamp, message, _| {
                    if let Some(event) = decode(message, timestamp) {
                        sink(event);
                    }
                },
                (),
            )
            .map_err(|e| InputError::Connect {
                device: device.name.clone(),
                message: e.to_string(),
            })?;

        Ok(Box::new(MidirListener {
            device_id: device.id.clone(),
            connection,
        }))
    }
}

struct MidirListener {
    device_id: String,
    connection: MidiInputConnection<()>,
}

impl Listener for MidirListener {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn detach(self: Box<Self>) {
        let _ = self.connection.close();
    }
}
