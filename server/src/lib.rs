//! utbridge-server – Bibliotheks-Root
//!
//! Verdrahtet Konfiguration, Relay-Kern und die Konsolen-Chatseite und
//! stellt den Einstiegspunkt fuer Integrationstests bereit.

pub mod config;
pub mod sink;

use anyhow::Result;
use config::RelayConfig;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use utbridge_relay::{AusgangsErgebnis, AusgangsSink, Relay, RelayError, RelayHandle};

use sink::{LogSink, chat_zeile_parsen};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: RelayConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Startet den Relay und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Relay-Konfiguration pruefen
    /// 2. Relay starten (Netzwerk- + Dispatch-Task)
    /// 3. Konsolenzeilen als Chat-Nachrichten weiterleiten bis Ctrl-C
    /// 4. Relay stoppen
    pub async fn starten(self) -> Result<()> {
        let konfig = self.config.relay_konfig()?;

        tracing::info!(
            adresse = %self.config.relay_adresse(),
            cache = ?konfig.cache,
            heartbeat = ?konfig.verbindung.heartbeat_intervall,
            "Relay startet"
        );

        let relay = Relay::starten(konfig, Arc::new(LogSink));

        tracing::info!("Relay laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        let ergebnis = konsole_schleife(
            &relay,
            BufReader::new(tokio::io::stdin()),
            tokio::signal::ctrl_c(),
        )
        .await;

        relay.stoppen().await;
        ergebnis?;
        Ok(())
    }
}

/// Leitet Zeilen aus `eingabe` als Chat-Nachrichten weiter, bis `stopp` fertig ist
///
/// `stopp` wird auch waehrend einer laufenden Weiterleitung beobachtet; eine
/// Nachricht, die noch auf den Spielserver wartet, wird dann verworfen. Endet
/// die Eingabe, wird nur noch auf `stopp` gewartet.
pub async fn konsole_schleife<S, R, F>(relay: &RelayHandle<S>, eingabe: R, stopp: F) -> io::Result<()>
where
    S: AusgangsSink,
    R: AsyncBufRead + Unpin,
    F: Future<Output = io::Result<()>>,
{
    tokio::pin!(stopp);
    let mut zeilen = eingabe.lines();
    let mut konsole_offen = true;

    loop {
        tokio::select! {
            signal = &mut stopp => {
                signal?;
                tracing::info!("Shutdown-Signal empfangen, Relay wird beendet");
                return Ok(());
            }
            zeile = zeilen.next_line(), if konsole_offen => match zeile {
                Ok(Some(zeile)) => {
                    let Some(nachricht) = chat_zeile_parsen(&zeile) else {
                        continue;
                    };
                    let ergebnis = tokio::select! {
                        ergebnis = relay.chat_weiterleiten(nachricht) => ergebnis,
                        signal = &mut stopp => {
                            signal?;
                            tracing::info!("Shutdown-Signal empfangen, laufende Zeile verworfen");
                            return Ok(());
                        }
                    };
                    match ergebnis {
                        Ok(AusgangsErgebnis::Gesendet) => {}
                        Ok(ergebnis) => tracing::debug!(?ergebnis, "Konsolenzeile verworfen"),
                        Err(RelayError::NichtVerbunden) => {
                            tracing::warn!("Kein Spielserver verbunden, Zeile verworfen");
                        }
                        Err(e) => tracing::warn!(fehler = %e, "Konsolenzeile nicht gesendet"),
                    }
                }
                Ok(None) => {
                    tracing::debug!("Konsole geschlossen");
                    konsole_offen = false;
                }
                Err(e) => {
                    tracing::warn!(fehler = %e, "Konsole nicht lesbar");
                    konsole_offen = false;
                }
            },
        }
    }
}
