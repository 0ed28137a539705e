//! Relay – Startet und stoppt Verbindungs-Manager und Dispatcher
//!
//! `Relay::starten` erzeugt zwei Tasks:
//! - Netzwerk-Task: `VerbindungsManager` (Socket, Heartbeat, Reconnect)
//! - Dispatch-Task: `RelayDispatcher::eingehend_schleife`
//!
//! Beide sind ueber eine mpsc-Queue verbunden. `RelayHandle::stoppen`
//! setzt das Shutdown-Signal und wartet auf beide Tasks.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::dedup::{DedupCache, DedupGrenze};
use crate::dispatcher::{AusgangsErgebnis, ChatNachricht, DispatcherKonfig, RelayDispatcher};
use crate::error::RelayResult;
use crate::sink::AusgangsSink;
use crate::statistik::{RelayStatistik, StatistikSnapshot};
use crate::verbindung::{VerbindungsHandle, VerbindungsKonfig, VerbindungsManager, VerbindungsZustand};

/// Laenge der Event-Queue zwischen Netzwerk- und Dispatch-Task
pub const STANDARD_EVENT_QUEUE: usize = 256;

/// Gesamtkonfiguration des Relays
#[derive(Debug, Clone, Default)]
pub struct RelayKonfig {
    pub verbindung: VerbindungsKonfig,
    pub cache: DedupGrenze,
    pub dispatcher: DispatcherKonfig,
}

/// Einstiegspunkt
pub struct Relay;

impl Relay {
    /// Startet Netzwerk- und Dispatch-Task
    pub fn starten<S: AusgangsSink>(konfig: RelayKonfig, sink: Arc<S>) -> RelayHandle<S> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::channel(STANDARD_EVENT_QUEUE);
        let statistik = Arc::new(RelayStatistik::neu());

        let (verbindung, netzwerk_task) = VerbindungsManager::starten(
            konfig.verbindung,
            event_tx,
            shutdown_rx,
            Arc::clone(&statistik),
        );

        let dispatcher = Arc::new(RelayDispatcher::neu(
            konfig.dispatcher,
            Arc::new(DedupCache::neu(konfig.cache)),
            sink,
            verbindung.clone(),
            Arc::clone(&statistik),
        ));

        let dispatch_task = {
            let dispatcher = Arc::clone(&dispatcher);
            // Endet sobald der Netzwerk-Task seinen Event-Sender verwirft
            tokio::spawn(async move { dispatcher.eingehend_schleife(event_rx).await })
        };

        tracing::info!("Relay gestartet");

        RelayHandle {
            dispatcher,
            verbindung,
            statistik,
            shutdown_tx,
            netzwerk_task,
            dispatch_task,
        }
    }
}

/// Handle auf einen laufenden Relay
pub struct RelayHandle<S: AusgangsSink> {
    dispatcher: Arc<RelayDispatcher<S, VerbindungsHandle>>,
    verbindung: VerbindungsHandle,
    statistik: Arc<RelayStatistik>,
    shutdown_tx: watch::Sender<bool>,
    netzwerk_task: JoinHandle<()>,
    dispatch_task: JoinHandle<()>,
}

impl<S: AusgangsSink> RelayHandle<S> {
    /// Leitet eine Chat-Nachricht an den Spielserver weiter
    pub async fn chat_weiterleiten(&self, nachricht: ChatNachricht) -> RelayResult<AusgangsErgebnis> {
        self.dispatcher.ausgehend(nachricht).await
    }

    pub fn zustand(&self) -> VerbindungsZustand {
        self.verbindung.zustand()
    }

    /// Handle des Verbindungs-Managers (Zustand abonnieren, direkt senden)
    pub fn verbindung(&self) -> &VerbindungsHandle {
        &self.verbindung
    }

    pub fn statistik(&self) -> StatistikSnapshot {
        self.statistik.snapshot()
    }

    pub fn lokale_adresse(&self) -> Option<SocketAddr> {
        self.verbindung.lokale_adresse()
    }

    pub async fn adresse_abwarten(&self) -> RelayResult<SocketAddr> {
        self.verbindung.adresse_abwarten().await
    }

    /// Faehrt den Relay herunter und wartet auf beide Tasks
    pub async fn stoppen(self) -> StatistikSnapshot {
        let _ = self.shutdown_tx.send(true);

        if let Err(e) = self.netzwerk_task.await {
            tracing::error!(fehler = %e, "Netzwerk-Task abgebrochen");
        }
        if let Err(e) = self.dispatch_task.await {
            tracing::error!(fehler = %e, "Dispatch-Task abgebrochen");
        }

        let snapshot = self.statistik.snapshot();
        tracing::info!(statistik = %snapshot.zusammenfassung(), "Relay gestoppt");
        snapshot
    }
}
