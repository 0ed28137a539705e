//! Relay-Dispatcher – Routet Events zwischen Spielserver und Chat
//!
//! ## Eingehend (Spielserver -> Chat)
//! ```text
//! SpielEvent -> Art pruefen -> Fingerprint -> DedupCache -> AusgangsSink
//!                   |                            |
//!                   +-> ignoriert                +-> Duplikat
//! ```
//! Nicht zustellbare Arten (unbekannt, eigene Outbound-Datensaetze) werden
//! verworfen, ohne den Cache zu beruehren. Scheitert die Zustellung, bleibt
//! das Event trotzdem als gesehen markiert.
//!
//! ## Ausgehend (Chat -> Spielserver)
//! Eine Chat-Nachricht wird als `Say` mit dem Benutzernamen als Sender
//! ueber den `SpielKanal` geschrieben. Verworfen werden Nachrichten von
//! Bots, leere Nachrichten und alles mit dem Echo-Praefix.

use std::sync::Arc;
use tokio::sync::mpsc;
use utbridge_protocol::SpielEvent;

use crate::dedup::{DedupCache, Fingerprint};
use crate::error::RelayResult;
use crate::sink::{AusgangsSink, SpielKanal};
use crate::statistik::RelayStatistik;

/// Standard-Praefix fuer Nachrichten, die der Relay selbst erzeugt hat
pub const STANDARD_ECHO_PRAEFIX: &str = "Discord: ";

/// Konfiguration des Dispatchers
#[derive(Debug, Clone)]
pub struct DispatcherKonfig {
    /// Ausgehende Nachrichten mit diesem Praefix werden nicht gesendet
    pub echo_praefix: String,
    /// Event-Art in den Dedup-Fingerprint aufnehmen
    pub art_im_fingerprint: bool,
}

impl Default for DispatcherKonfig {
    fn default() -> Self {
        Self {
            echo_praefix: STANDARD_ECHO_PRAEFIX.into(),
            art_im_fingerprint: true,
        }
    }
}

/// Nachricht aus dem Chat in Richtung Spielserver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatNachricht {
    pub benutzer: String,
    pub inhalt: String,
    /// Nachricht stammt von einem Bot-Konto
    pub ist_bot: bool,
}

impl ChatNachricht {
    pub fn neu(benutzer: impl Into<String>, inhalt: impl Into<String>) -> Self {
        Self {
            benutzer: benutzer.into(),
            inhalt: inhalt.into(),
            ist_bot: false,
        }
    }

    pub fn von_bot(mut self) -> Self {
        self.ist_bot = true;
        self
    }
}

/// Ergebnis der eingehenden Verarbeitung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EingangsErgebnis {
    Zugestellt,
    Duplikat,
    /// Art wird nicht weitergeleitet
    Ignoriert,
    /// Sink hat abgelehnt, Event bleibt gesehen
    SinkFehler,
}

/// Ergebnis der ausgehenden Verarbeitung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AusgangsErgebnis {
    Gesendet,
    EchoVerworfen,
    BotVerworfen,
    LeerVerworfen,
}

// ---------------------------------------------------------------------------
// RelayDispatcher
// ---------------------------------------------------------------------------

/// Verbindet Dedup-Cache, Chat-Sink und Spielserver-Kanal
pub struct RelayDispatcher<S, K>
where
    S: AusgangsSink,
    K: SpielKanal,
{
    konfig: DispatcherKonfig,
    cache: Arc<DedupCache>,
    sink: Arc<S>,
    kanal: K,
    statistik: Arc<RelayStatistik>,
}

impl<S, K> RelayDispatcher<S, K>
where
    S: AusgangsSink,
    K: SpielKanal,
{
    pub fn neu(
        konfig: DispatcherKonfig,
        cache: Arc<DedupCache>,
        sink: Arc<S>,
        kanal: K,
        statistik: Arc<RelayStatistik>,
    ) -> Self {
        Self {
            konfig,
            cache,
            sink,
            kanal,
            statistik,
        }
    }

    pub fn cache(&self) -> &Arc<DedupCache> {
        &self.cache
    }

    pub fn statistik(&self) -> &Arc<RelayStatistik> {
        &self.statistik
    }

    /// Verarbeitet ein dekodiertes Event vom Spielserver
    pub async fn eingehend(&self, event: SpielEvent) -> EingangsErgebnis {
        if !event.art.ist_zustellbar() {
            self.statistik.ignoriert();
            tracing::trace!(art = %event.art, sender = %event.sender, "Event ignoriert");
            return EingangsErgebnis::Ignoriert;
        }

        let fingerprint = Fingerprint::aus_event(&event, self.konfig.art_im_fingerprint);
        if self.cache.pruefen_und_merken(fingerprint) {
            self.statistik.duplikat();
            tracing::debug!(
                art = %event.art,
                sender = %event.sender,
                cache = self.cache.laenge(),
                "Duplikat verworfen"
            );
            return EingangsErgebnis::Duplikat;
        }

        match self.sink.zustellen(&event).await {
            Ok(()) => {
                self.statistik.zugestellt();
                EingangsErgebnis::Zugestellt
            }
            Err(e) => {
                self.statistik.sink_fehler();
                tracing::warn!(
                    art = %event.art,
                    sender = %event.sender,
                    fehler = %e,
                    "Zustellung an den Chat fehlgeschlagen"
                );
                EingangsErgebnis::SinkFehler
            }
        }
    }

    /// Sendet eine Chat-Nachricht an den Spielserver
    ///
    /// Verworfene Nachrichten sind kein Fehler; `Err` kommt nur vom
    /// Schreibweg (z.B. `NichtVerbunden` nach allen Warteversuchen).
    pub async fn ausgehend(&self, nachricht: ChatNachricht) -> RelayResult<AusgangsErgebnis> {
        if nachricht.ist_bot {
            self.statistik.ausgehend_verworfen();
            return Ok(AusgangsErgebnis::BotVerworfen);
        }
        if nachricht.inhalt.trim().is_empty() {
            self.statistik.ausgehend_verworfen();
            return Ok(AusgangsErgebnis::LeerVerworfen);
        }
        if !self.konfig.echo_praefix.is_empty()
            && nachricht.inhalt.starts_with(&self.konfig.echo_praefix)
        {
            self.statistik.ausgehend_verworfen();
            tracing::debug!(benutzer = %nachricht.benutzer, "Echo verworfen");
            return Ok(AusgangsErgebnis::EchoVerworfen);
        }

        let event = SpielEvent::chat(nachricht.benutzer, nachricht.inhalt);
        match self.kanal.senden(event).await {
            Ok(()) => {
                self.statistik.ausgehend_gesendet();
                Ok(AusgangsErgebnis::Gesendet)
            }
            Err(e) => {
                self.statistik.ausgehend_fehler();
                tracing::warn!(fehler = %e, "Chat-Nachricht nicht an den Spielserver gesendet");
                Err(e)
            }
        }
    }

    /// Verarbeitet Events aus der Queue in Ankunftsreihenfolge
    ///
    /// Endet, sobald alle Sender der Queue verworfen sind.
    pub async fn eingehend_schleife(&self, mut rx: mpsc::Receiver<SpielEvent>) {
        while let Some(event) = rx.recv().await {
            self.eingehend(event).await;
        }
        tracing::debug!("Dispatcher-Schleife beendet");
    }
}
