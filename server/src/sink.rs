//! Chat-Seite des Servers
//!
//! Die eigentliche Chat-Plattform ist extern angebunden. Der Server bringt
//! zwei einfache Enden mit:
//! - `LogSink`: schreibt jedes zugestellte Event als Log-Zeile
//! - `chat_zeile_parsen`: macht aus einer Konsolenzeile `name: text` eine
//!   Chat-Nachricht in Richtung Spielserver

use async_trait::async_trait;
use utbridge_protocol::SpielEvent;
use utbridge_relay::{AusgangsSink, ChatNachricht, RelayResult};

/// Benutzername fuer Konsolenzeilen ohne `name:`
pub const KONSOLEN_BENUTZER: &str = "Konsole";

/// Gibt zugestellte Events als strukturierte Log-Zeilen aus
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AusgangsSink for LogSink {
    async fn zustellen(&self, event: &SpielEvent) -> RelayResult<()> {
        if event.ohne_team() {
            tracing::info!(
                target: "utbridge::chat",
                art = %event.art,
                sender = %event.sender,
                msg = %event.nachricht,
                "Spiel-Event"
            );
        } else {
            tracing::info!(
                target: "utbridge::chat",
                art = %event.art,
                sender = %event.sender,
                team = %event.team_index,
                msg = %event.nachricht,
                "Spiel-Event"
            );
        }
        Ok(())
    }
}

/// Parst eine Konsolenzeile zu einer Chat-Nachricht
///
/// `Alice: hallo` ergibt Benutzer `Alice`; ohne Doppelpunkt wird
/// `KONSOLEN_BENUTZER` verwendet. Leere Zeilen ergeben `None`.
pub fn chat_zeile_parsen(zeile: &str) -> Option<ChatNachricht> {
    let zeile = zeile.trim();
    if zeile.is_empty() {
        return None;
    }

    match zeile.split_once(':') {
        Some((benutzer, inhalt)) if !benutzer.trim().is_empty() && !benutzer.contains(' ') => {
            Some(ChatNachricht::neu(benutzer.trim(), inhalt.trim_start()))
        }
        _ => Some(ChatNachricht::neu(KONSOLEN_BENUTZER, zeile)),
    }
}
