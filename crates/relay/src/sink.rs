//! Schnittstellen zu den beiden Seiten des Relays
//!
//! - `AusgangsSink`: die Chat-Plattform. Praesentation (Farben, Embeds,
//!   Kanal-Aufloesung) ist allein Sache der Implementierung; der Relay
//!   liefert nur das strukturierte Event.
//! - `SpielKanal`: der Schreibweg zum Spielserver, implementiert vom
//!   `VerbindungsHandle`.

use async_trait::async_trait;
use tokio::sync::mpsc;
use utbridge_protocol::SpielEvent;

use crate::error::{RelayError, RelayResult};

/// Zustellung eines Spiel-Events an die Chat-Plattform
///
/// Entspricht `deliver(kind, sender, message, teamIndex)`: alle vier Werte
/// stecken im uebergebenen `SpielEvent`.
#[async_trait]
pub trait AusgangsSink: Send + Sync + 'static {
    async fn zustellen(&self, event: &SpielEvent) -> RelayResult<()>;
}

/// Schreibweg zum Spielserver
#[async_trait]
pub trait SpielKanal: Send + Sync + 'static {
    async fn senden(&self, event: SpielEvent) -> RelayResult<()>;
}

// ---------------------------------------------------------------------------
// KanalSink
// ---------------------------------------------------------------------------

/// Sink, der zugestellte Events in eine tokio-Queue schreibt
///
/// Fuer Chat-Clients, die in einem eigenen Task laufen, und fuer Tests.
#[derive(Clone, Debug)]
pub struct KanalSink {
    tx: mpsc::UnboundedSender<SpielEvent>,
}

impl KanalSink {
    /// Erstellt den Sink und gibt die Empfangsseite zurueck
    pub fn neu() -> (Self, mpsc::UnboundedReceiver<SpielEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl AusgangsSink for KanalSink {
    async fn zustellen(&self, event: &SpielEvent) -> RelayResult<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| RelayError::zustellung("Empfaenger geschlossen"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utbridge_protocol::EventArt;

    #[tokio::test]
    async fn kanal_sink_leitet_weiter() {
        let (sink, mut rx) = KanalSink::neu();
        let event = SpielEvent::neu(EventArt::FlagCap, "Eve", "Eve captured the flag");
        sink.zustellen(&event).await.unwrap();
        assert_eq!(rx.recv().await, Some(event));
    }

    #[tokio::test]
    async fn kanal_sink_ohne_empfaenger_meldet_fehler() {
        let (sink, rx) = KanalSink::neu();
        drop(rx);
        let fehler = sink
            .zustellen(&SpielEvent::chat("Alice", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(fehler, RelayError::Zustellung(_)));
    }
}
