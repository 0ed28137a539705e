//! utbridge-relay – Relay-Kern zwischen Spielserver und Chat-Plattform
//!
//! Der Spielserver verbindet sich per TCP mit dem Relay und schickt
//! NUL-getrennte JSON-Events. Der Relay dedupliziert sie und reicht sie an
//! die Chat-Seite weiter; Chat-Nachrichten gehen als `Say` zurueck.
//!
//! ## Architektur
//! ```text
//! Spielserver ──TCP──> VerbindungsManager ──mpsc──> RelayDispatcher ──> AusgangsSink
//!      ^                      ^                         │    │
//!      │                      │                         │    └──> DedupCache
//!      └──────────────────────┴──── VerbindungsHandle <─┘ (ausgehend)
//! ```
//!
//! ## Module
//! - `verbindung`: Socket-Besitzer, Accept-/Reconnect-State-Machine, Heartbeat
//! - `dispatcher`: Klassifizierung, Dedup, Anti-Echo
//! - `dedup`: FIFO- oder Zeitfenster-Cache
//! - `relay`: Start/Stopp beider Tasks
//! - `sink`: Schnittstellen zur Chat-Seite und zum Spielserver

pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod relay;
pub mod sink;
pub mod statistik;
pub mod verbindung;

pub use dedup::{DedupCache, DedupGrenze, Fingerprint};
pub use dispatcher::{AusgangsErgebnis, ChatNachricht, DispatcherKonfig, EingangsErgebnis, RelayDispatcher};
pub use error::{RelayError, RelayResult};
pub use relay::{Relay, RelayHandle, RelayKonfig};
pub use sink::{AusgangsSink, KanalSink, SpielKanal};
pub use statistik::{RelayStatistik, StatistikSnapshot};
pub use verbindung::{VerbindungsHandle, VerbindungsKonfig, VerbindungsManager, VerbindungsZustand};
