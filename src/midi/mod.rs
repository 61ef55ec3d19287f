mod decode;
#[cfg(test)]
pub(crate) mod fake;
mod host;
mod session;

pub use decode::decode;
pub use host::{Listener, MidiHost, MidirHost, NoteSink};
pub use session::InputSession;

pub const CLIENT_NAME: &str = "drumsight";
