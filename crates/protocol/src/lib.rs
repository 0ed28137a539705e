//! utbridge-protocol – Wire-Protokoll der Spielserver-Verbindung
//!
//! Dieses Crate definiert das Event-Modell (`SpielEvent`, `EventArt`) und
//! das NUL-getrennte JSON-Framing, ueber das der Spielserver mit dem Relay
//! spricht.

pub mod error;
pub mod event;
pub mod wire;

pub use error::{CodecError, CodecResult};
pub use event::{EventArt, SpielEvent};
pub use wire::{NulFrameCodec, event_kodieren, segment_dekodieren};
