//! Verbindungs-Manager – Besitzt den einzigen Socket zum Spielserver
//!
//! Der Manager laeuft als eigener tokio-Task und ist der einzige Besitzer
//! des Sockets. Alle anderen Komponenten sprechen ueber den
//! `VerbindungsHandle` mit ihm (Befehls-Queue + watch-Kanaele).
//!
//! ## State Machine
//! ```text
//! Leerlauf -> Lauschend -> Verbunden -> Abbauend -> Wiederverbindend
//!                 ^                                        |
//!                 +----------------------------------------+
//! ```
//!
//! - Bind-/Accept-Fehler: nach `bind_wiederholung` erneut binden, endlos
//! - EOF oder Lesefehler: sofort zurueck nach `Lauschend`
//! - `ServerTravel`: Socket schliessen, `reise_verzoegerung` warten
//! - Heartbeat (optional): alle `heartbeat_intervall` ein PING; kam bis
//!   zum naechsten Tick keine Heartbeat-Antwort, wird neu verbunden
//!
//! ## Sendepolitik
//! Ist beim Senden kein Spielserver verbunden, wartet `senden` bis zu
//! `sende_versuche` mal je `sende_abstand` auf eine neue Verbindung und
//! liefert danach `RelayError::NichtVerbunden`. Mit `sende_versuche = 0`
//! schlaegt der Aufruf sofort fehl.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::codec::{FramedRead, FramedWrite};
use utbridge_protocol::wire::STANDARD_MAX_FRAME_GROESSE;
use utbridge_protocol::{CodecError, EventArt, NulFrameCodec, SpielEvent, segment_dekodieren};

use crate::error::{RelayError, RelayResult};
use crate::sink::SpielKanal;
use crate::statistik::RelayStatistik;

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Groesse der Befehls-Queue (Senden)
const BEFEHL_QUEUE_GROESSE: usize = 64;

/// Backlog des Listen-Sockets
const LISTEN_BACKLOG: u32 = 16;

/// Standard-Frist fuer einen einzelnen Schreibvorgang
const STANDARD_SCHREIB_TIMEOUT: Duration = Duration::from_secs(10);

type Schreiber = FramedWrite<OwnedWriteHalf, NulFrameCodec>;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration des Verbindungs-Managers
#[derive(Debug, Clone)]
pub struct VerbindungsKonfig {
    /// Host, auf dem gelauscht wird
    pub host: String,
    /// Port (0 = vom Betriebssystem gewaehlt, danach fixiert)
    pub port: u16,
    /// Wartezeit nach fehlgeschlagenem Bind/Accept
    pub bind_wiederholung: Duration,
    /// Wartezeit nach `ServerTravel`, bevor wieder gelauscht wird
    pub reise_verzoegerung: Duration,
    /// Heartbeat-Intervall (None = kein Heartbeat)
    pub heartbeat_intervall: Option<Duration>,
    /// Warteversuche beim Senden ohne Verbindung
    pub sende_versuche: u32,
    /// Abstand zwischen den Warteversuchen
    pub sende_abstand: Duration,
    /// Laengste Dauer eines Schreibvorgangs, bevor die Verbindung als tot
    /// gilt (mit Heartbeat hoechstens ein Intervall)
    pub schreib_timeout: Duration,
    /// Groesse des Lesepuffers pro Read
    pub lese_puffer: usize,
    /// Maximale Groesse eines Frames
    pub max_frame_groesse: usize,
}

impl Default for VerbindungsKonfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 49321,
            bind_wiederholung: Duration::from_secs(5),
            reise_verzoegerung: Duration::from_secs(15),
            heartbeat_intervall: None,
            sende_versuche: 5,
            sende_abstand: Duration::from_secs(5),
            schreib_timeout: STANDARD_SCHREIB_TIMEOUT,
            lese_puffer: 1024,
            max_frame_groesse: STANDARD_MAX_FRAME_GROESSE,
        }
    }
}

impl VerbindungsKonfig {
    /// Frist fuer einen Schreibvorgang
    ///
    /// Mit Heartbeat darf ein Schreiben nicht laenger blockieren als ein
    /// Intervall, sonst wuerde der ausbleibende PONG nie bemerkt.
    pub fn schreib_frist(&self) -> Duration {
        match self.heartbeat_intervall {
            Some(intervall) => intervall.min(self.schreib_timeout),
            None => self.schreib_timeout,
        }
    }
}

// ---------------------------------------------------------------------------
// Verbindungszustand
// ---------------------------------------------------------------------------

/// Zustand der Spielserver-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Noch nicht gestartet oder bereits beendet
    Leerlauf,
    /// Gebunden, wartet auf den Spielserver
    Lauschend,
    /// Spielserver verbunden
    Verbunden,
    /// Socket wird geschlossen
    Abbauend,
    /// Wartet vor dem naechsten Bind
    Wiederverbindend,
}

/// Warum eine Sitzung endete
#[derive(Debug)]
enum SitzungsEnde {
    /// Gegenseite hat geschlossen (EOF)
    Geschlossen,
    /// Lese- oder Schreibfehler
    Fehler(io::Error),
    /// `ServerTravel` empfangen
    Reise,
    /// Heartbeat-Antwort ausgeblieben
    HeartbeatTimeout,
    /// Shutdown-Signal
    Stopp,
}

/// Fehlgeschlagener Schreibvorgang
#[derive(Debug)]
enum SchreibFehler {
    /// Event nicht kodierbar, die Verbindung bleibt bestehen
    Abgelehnt(CodecError),
    /// Die Sitzung ist zu Ende
    Ende(SitzungsEnde),
}

impl SchreibFehler {
    fn als_sitzungsende(self) -> SitzungsEnde {
        match self {
            Self::Abgelehnt(e) => SitzungsEnde::Fehler(io::Error::new(io::ErrorKind::InvalidData, e)),
            Self::Ende(ende) => ende,
        }
    }
}

/// Ergebnis eines Accept-Versuchs
enum Annahme {
    Verbunden(TcpStream, SocketAddr),
    Fehler(io::Error),
    Stopp,
}

/// Befehle vom Handle an den Manager-Task
enum Befehl {
    Senden {
        event: SpielEvent,
        antwort: oneshot::Sender<RelayResult<()>>,
    },
}

// ---------------------------------------------------------------------------
// VerbindungsHandle
// ---------------------------------------------------------------------------

/// Handle auf den laufenden Verbindungs-Manager
///
/// Clone teilt dieselbe Verbindung.
#[derive(Clone, Debug)]
pub struct VerbindungsHandle {
    befehl_tx: mpsc::Sender<Befehl>,
    zustand_rx: watch::Receiver<VerbindungsZustand>,
    adresse_rx: watch::Receiver<Option<SocketAddr>>,
    sende_versuche: u32,
    sende_abstand: Duration,
}

impl std::fmt::Debug for Befehl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Befehl::Senden { event, .. } => f.debug_struct("Senden").field("event", event).finish(),
        }
    }
}

impl VerbindungsHandle {
    /// Aktueller Verbindungszustand
    pub fn zustand(&self) -> VerbindungsZustand {
        *self.zustand_rx.borrow()
    }

    /// Abonniert Zustandsaenderungen
    pub fn zustand_abonnieren(&self) -> watch::Receiver<VerbindungsZustand> {
        self.zustand_rx.clone()
    }

    /// Tatsaechlich gebundene Adresse (None vor dem ersten Bind)
    pub fn lokale_adresse(&self) -> Option<SocketAddr> {
        *self.adresse_rx.borrow()
    }

    /// Wartet bis der erste Bind erfolgreich war
    pub async fn adresse_abwarten(&self) -> RelayResult<SocketAddr> {
        let mut rx = self.adresse_rx.clone();
        let adresse = rx
            .wait_for(|adresse| adresse.is_some())
            .await
            .map_err(|_| RelayError::Gestoppt)?;
        (*adresse).ok_or(RelayError::Gestoppt)
    }

    /// Wartet bis der Zustand das Praedikat erfuellt
    pub async fn zustand_abwarten(
        &self,
        bedingung: impl FnMut(&VerbindungsZustand) -> bool,
    ) -> RelayResult<VerbindungsZustand> {
        let mut rx = self.zustand_rx.clone();
        let zustand = rx.wait_for(bedingung).await.map_err(|_| RelayError::Gestoppt)?;
        Ok(*zustand)
    }

    /// Sendet ein Event an den Spielserver
    ///
    /// Ohne Verbindung wird gemaess Sendepolitik auf eine Wiederverbindung
    /// gewartet (siehe Moduldoku).
    pub async fn senden(&self, event: SpielEvent) -> RelayResult<()> {
        let mut versuch = 0;
        loop {
            if self.zustand() == VerbindungsZustand::Verbunden {
                match self.direkt_senden(event.clone()).await {
                    // Verbindung ist zwischen Pruefung und Schreiben weggefallen
                    Err(RelayError::NichtVerbunden) => {}
                    ergebnis => return ergebnis,
                }
            }

            if versuch >= self.sende_versuche {
                return Err(RelayError::NichtVerbunden);
            }
            versuch += 1;

            tracing::info!(
                versuch,
                max = self.sende_versuche,
                "Kein Spielserver verbunden, warte auf Wiederverbindung"
            );

            let mut rx = self.zustand_rx.clone();
            let warten = rx.wait_for(|zustand| *zustand == VerbindungsZustand::Verbunden);
            let beendet = matches!(tokio::time::timeout(self.sende_abstand, warten).await, Ok(Err(_)));
            if beendet {
                return Err(RelayError::Gestoppt);
            }
        }
    }

    async fn direkt_senden(&self, event: SpielEvent) -> RelayResult<()> {
        let (antwort, antwort_rx) = oneshot::channel();
        self.befehl_tx
            .send(Befehl::Senden { event, antwort })
            .await
            .map_err(|_| RelayError::Gestoppt)?;
        antwort_rx.await.map_err(|_| RelayError::Gestoppt)?
    }
}

#[async_trait]
impl SpielKanal for VerbindungsHandle {
    async fn senden(&self, event: SpielEvent) -> RelayResult<()> {
        VerbindungsHandle::senden(self, event).await
    }
}

// ---------------------------------------------------------------------------
// VerbindungsManager
// ---------------------------------------------------------------------------

/// Besitzer-Task der Spielserver-Verbindung
pub struct VerbindungsManager {
    konfig: VerbindungsKonfig,
    /// Dekodierte Events in Ankunftsreihenfolge an den Dispatcher
    event_tx: mpsc::Sender<SpielEvent>,
    befehl_rx: mpsc::Receiver<Befehl>,
    zustand_tx: watch::Sender<VerbindungsZustand>,
    adresse_tx: watch::Sender<Option<SocketAddr>>,
    shutdown_rx: watch::Receiver<bool>,
    statistik: Arc<RelayStatistik>,
    /// Aufgeloeste Bind-Adresse, nach dem ersten Bind fixiert
    bind_adresse: Option<SocketAddr>,
}

impl VerbindungsManager {
    /// Startet den Manager-Task
    ///
    /// Der Task laeuft bis `shutdown_rx` `true` meldet; der zurueckgegebene
    /// `JoinHandle` endet erst, nachdem der Socket geschlossen wurde.
    pub fn starten(
        konfig: VerbindungsKonfig,
        event_tx: mpsc::Sender<SpielEvent>,
        shutdown_rx: watch::Receiver<bool>,
        statistik: Arc<RelayStatistik>,
    ) -> (VerbindungsHandle, JoinHandle<()>) {
        let (befehl_tx, befehl_rx) = mpsc::channel(BEFEHL_QUEUE_GROESSE);
        let (zustand_tx, zustand_rx) = watch::channel(VerbindungsZustand::Leerlauf);
        let (adresse_tx, adresse_rx) = watch::channel(None);

        let handle = VerbindungsHandle {
            befehl_tx,
            zustand_rx,
            adresse_rx,
            sende_versuche: konfig.sende_versuche,
            sende_abstand: konfig.sende_abstand,
        };

        let manager = Self {
            konfig,
            event_tx,
            befehl_rx,
            zustand_tx,
            adresse_tx,
            shutdown_rx,
            statistik,
            bind_adresse: None,
        };

        (handle, tokio::spawn(manager.ausfuehren()))
    }

    async fn ausfuehren(mut self) {
        tracing::debug!(
            host = %self.konfig.host,
            port = self.konfig.port,
            "Verbindungs-Manager gestartet"
        );

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }

            let listener = match self.binden().await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(
                        fehler = %e,
                        wiederholung_sek = self.konfig.bind_wiederholung.as_secs_f32(),
                        "Binden fehlgeschlagen"
                    );
                    if !self.warten(self.konfig.bind_wiederholung).await {
                        break;
                    }
                    continue;
                }
            };
            self.zustand_setzen(VerbindungsZustand::Lauschend);

            let (stream, peer) = match self.annehmen(&listener).await {
                Annahme::Verbunden(stream, peer) => (stream, peer),
                Annahme::Fehler(e) => {
                    tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                    drop(listener);
                    self.zustand_setzen(VerbindungsZustand::Wiederverbindend);
                    if !self.warten(self.konfig.bind_wiederholung).await {
                        break;
                    }
                    continue;
                }
                Annahme::Stopp => break,
            };
            // Nur ein Spielserver gleichzeitig
            drop(listener);

            self.statistik.verbunden();
            self.zustand_setzen(VerbindungsZustand::Verbunden);

            match self.sitzung(stream, peer).await {
                SitzungsEnde::Stopp => break,
                SitzungsEnde::Reise => {
                    self.zustand_setzen(VerbindungsZustand::Wiederverbindend);
                    tracing::info!(
                        verzoegerung_sek = self.konfig.reise_verzoegerung.as_secs_f32(),
                        "Spielserver wechselt die Map, warte vor erneutem Lauschen"
                    );
                    if !self.warten(self.konfig.reise_verzoegerung).await {
                        break;
                    }
                }
                SitzungsEnde::HeartbeatTimeout => {
                    self.zustand_setzen(VerbindungsZustand::Wiederverbindend);
                }
                SitzungsEnde::Geschlossen => {
                    tracing::info!(peer = %peer, "Spielserver hat die Verbindung geschlossen");
                    self.zustand_setzen(VerbindungsZustand::Wiederverbindend);
                }
                SitzungsEnde::Fehler(e) => {
                    tracing::warn!(peer = %peer, fehler = %e, "Verbindungsfehler");
                    self.zustand_setzen(VerbindungsZustand::Wiederverbindend);
                }
            }
        }

        self.zustand_setzen(VerbindungsZustand::Leerlauf);
        tracing::debug!("Verbindungs-Manager beendet");
    }

    fn zustand_setzen(&self, zustand: VerbindungsZustand) {
        let alt = self.zustand_tx.send_replace(zustand);
        if alt != zustand {
            tracing::debug!(von = ?alt, nach = ?zustand, "Verbindungszustand");
        }
    }

    /// Bindet den Listen-Socket mit SO_REUSEADDR
    async fn binden(&mut self) -> io::Result<TcpListener> {
        let adresse = match self.bind_adresse {
            Some(adresse) => adresse,
            None => bind_adresse_waehlen(
                tokio::net::lookup_host((self.konfig.host.as_str(), self.konfig.port)).await?,
            )
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("Host nicht aufloesbar: {}", self.konfig.host),
                )
            })?,
        };

        let socket = if adresse.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(adresse)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;

        let lokal = listener.local_addr()?;
        self.bind_adresse = Some(lokal);
        self.adresse_tx.send_replace(Some(lokal));

        tracing::info!(adresse = %lokal, "Warte auf Verbindung des Spielservers");
        Ok(listener)
    }

    async fn annehmen(&mut self, listener: &TcpListener) -> Annahme {
        loop {
            tokio::select! {
                ergebnis = listener.accept() => {
                    return match ergebnis {
                        Ok((stream, peer)) => Annahme::Verbunden(stream, peer),
                        Err(e) => Annahme::Fehler(e),
                    };
                }
                Some(befehl) = self.befehl_rx.recv() => self.ablehnen(befehl),
                _ = stopp_signal(&mut self.shutdown_rx) => return Annahme::Stopp,
            }
        }
    }

    /// Wartet die Dauer ab; gibt `false` zurueck wenn dabei gestoppt wurde
    async fn warten(&mut self, dauer: Duration) -> bool {
        let frist = tokio::time::sleep(dauer);
        tokio::pin!(frist);

        loop {
            tokio::select! {
                _ = &mut frist => return true,
                Some(befehl) = self.befehl_rx.recv() => self.ablehnen(befehl),
                _ = stopp_signal(&mut self.shutdown_rx) => return false,
            }
        }
    }

    fn ablehnen(&self, befehl: Befehl) {
        let Befehl::Senden { event, antwort } = befehl;
        tracing::debug!(sender = %event.sender, "Senden ohne Verbindung abgelehnt");
        let _ = antwort.send(Err(RelayError::NichtVerbunden));
    }

    /// Bedient eine angenommene Verbindung bis sie endet
    async fn sitzung(&mut self, stream: TcpStream, peer: SocketAddr) -> SitzungsEnde {
        tracing::info!(peer = %peer, "Spielserver verbunden");

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(fehler = %e, "TCP_NODELAY nicht gesetzt");
        }

        let (lesen, schreiben) = stream.into_split();
        let mut frames = FramedRead::with_capacity(
            lesen,
            NulFrameCodec::with_max_size(self.konfig.max_frame_groesse),
            self.konfig.lese_puffer,
        );
        let mut schreiber =
            FramedWrite::new(schreiben, NulFrameCodec::with_max_size(self.konfig.max_frame_groesse));

        let mut heartbeat = self.konfig.heartbeat_intervall.map(|intervall| {
            let mut timer = tokio::time::interval_at(Instant::now() + intervall, intervall);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });
        // PING gesendet, aber noch keine Heartbeat-Antwort
        let mut antwort_ausstehend = false;

        let ende = loop {
            tokio::select! {
                frame = frames.next() => match frame {
                    Some(Ok(segment)) => {
                        if let Some(ende) = self
                            .segment_verarbeiten(&segment, &mut schreiber, &mut antwort_ausstehend, peer)
                            .await
                        {
                            break ende;
                        }
                    }
                    Some(Err(e)) => break SitzungsEnde::Fehler(e),
                    None => break SitzungsEnde::Geschlossen,
                },

                Some(befehl) = self.befehl_rx.recv() => {
                    let Befehl::Senden { event, antwort } = befehl;
                    let sender = event.sender.clone();
                    match self.schreiben(&mut schreiber, event).await {
                        Ok(()) => {
                            tracing::trace!(peer = %peer, sender = %sender, "Event gesendet");
                            let _ = antwort.send(Ok(()));
                        }
                        Err(SchreibFehler::Abgelehnt(e)) => {
                            tracing::warn!(peer = %peer, sender = %sender, fehler = %e, "Event nicht gesendet");
                            let _ = antwort.send(Err(e.into()));
                        }
                        Err(SchreibFehler::Ende(ende)) => {
                            let fehler = match &ende {
                                SitzungsEnde::Fehler(e) => RelayError::Io(io::Error::new(e.kind(), e.to_string())),
                                _ => RelayError::Gestoppt,
                            };
                            let _ = antwort.send(Err(fehler));
                            break ende;
                        }
                    }
                }

                _ = heartbeat_tick(&mut heartbeat) => {
                    if antwort_ausstehend {
                        tracing::warn!(peer = %peer, "Heartbeat-Antwort ausgeblieben, verbinde neu");
                        break SitzungsEnde::HeartbeatTimeout;
                    }
                    if let Err(e) = self.schreiben(&mut schreiber, SpielEvent::ping()).await {
                        break e.als_sitzungsende();
                    }
                    antwort_ausstehend = true;
                }

                _ = stopp_signal(&mut self.shutdown_rx) => {
                    tracing::info!(peer = %peer, "Shutdown-Signal – Verbindung wird getrennt");
                    break SitzungsEnde::Stopp;
                }
            }
        };

        if !matches!(ende, SitzungsEnde::Stopp) {
            self.zustand_setzen(VerbindungsZustand::Abbauend);
        }
        // Nur FIN senden, nicht flushen: der Puffer kann beim haengenden Peer
        // voll sein
        let _ = schreiber.get_mut().shutdown().await;
        drop(frames);

        ende
    }

    /// Schreibt ein Event auf die Verbindung
    ///
    /// Blockiert hoechstens `schreib_frist()` und bricht beim Shutdown-Signal
    /// ab. Ein Timeout beendet die Sitzung wie ein Schreibfehler.
    async fn schreiben(&mut self, schreiber: &mut Schreiber, event: SpielEvent) -> Result<(), SchreibFehler> {
        let frist = self.konfig.schreib_frist();

        tokio::select! {
            ergebnis = tokio::time::timeout(frist, schreiber.send(event)) => match ergebnis {
                Ok(Ok(())) => Ok(()),
                Ok(Err(CodecError::Io(e))) => Err(SchreibFehler::Ende(SitzungsEnde::Fehler(e))),
                Ok(Err(e)) => Err(SchreibFehler::Abgelehnt(e)),
                Err(_) => Err(SchreibFehler::Ende(SitzungsEnde::Fehler(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("Schreiben blockiert laenger als {} ms", frist.as_millis()),
                )))),
            },
            _ = stopp_signal(&mut self.shutdown_rx) => Err(SchreibFehler::Ende(SitzungsEnde::Stopp)),
        }
    }

    /// Verarbeitet ein rohes Segment; `Some` beendet die Sitzung
    async fn segment_verarbeiten(
        &mut self,
        segment: &[u8],
        schreiber: &mut Schreiber,
        antwort_ausstehend: &mut bool,
        peer: SocketAddr,
    ) -> Option<SitzungsEnde> {
        let event = match segment_dekodieren(segment) {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(e) => {
                self.statistik.frame_verworfen();
                tracing::warn!(peer = %peer, fehler = %e, "Fehlerhafter Datensatz verworfen");
                return None;
            }
        };

        match event.art {
            EventArt::Heartbeat => {
                *antwort_ausstehend = false;
                if event.ist_ping() {
                    if let Err(e) = self.schreiben(schreiber, SpielEvent::pong()).await {
                        return Some(e.als_sitzungsende());
                    }
                }
                tracing::trace!(peer = %peer, msg = %event.nachricht, "Heartbeat empfangen");
                None
            }
            EventArt::ServerTravel => {
                tracing::info!(peer = %peer, "ServerTravel empfangen");
                Some(SitzungsEnde::Reise)
            }
            _ => {
                tracing::trace!(peer = %peer, art = %event.art, sender = %event.sender, "Event empfangen");
                tokio::select! {
                    ergebnis = self.event_tx.send(event) => {
                        // Dispatcher ist weg, weiterlesen ist sinnlos
                        ergebnis.is_err().then_some(SitzungsEnde::Stopp)
                    }
                    _ = stopp_signal(&mut self.shutdown_rx) => Some(SitzungsEnde::Stopp),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

/// Wird fertig sobald Shutdown signalisiert oder der Sender verworfen wurde
async fn stopp_signal(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stopp| *stopp).await;
}

async fn heartbeat_tick(intervall: &mut Option<Interval>) {
    match intervall {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Bevorzugt IPv4, wie ein Spielserver `localhost` meist erreicht
fn bind_adresse_waehlen(adressen: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut erste = None;
    for adresse in adressen {
        if adresse.is_ipv4() {
            return Some(adresse);
        }
        erste.get_or_insert(adresse);
    }
    erste
}
