//! Integration-Tests fuer den Relay ueber echtes Loopback-TCP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use utbridge_protocol::{EventArt, SpielEvent};
use utbridge_relay::{
    AusgangsErgebnis, ChatNachricht, KanalSink, Relay, RelayHandle, RelayKonfig, VerbindungsKonfig,
    VerbindungsZustand,
};

const FRIST: Duration = Duration::from_secs(5);

fn konfig() -> RelayKonfig {
    RelayKonfig {
        verbindung: VerbindungsKonfig {
            host: "127.0.0.1".into(),
            port: 0,
            bind_wiederholung: Duration::from_millis(50),
            reise_verzoegerung: Duration::from_millis(200),
            sende_versuche: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("utbridge_relay=debug")
        .try_init();
}

async fn relay_starten(
    konfig: RelayKonfig,
) -> (RelayHandle<KanalSink>, mpsc::UnboundedReceiver<SpielEvent>, SocketAddr) {
    logging();
    let (sink, rx) = KanalSink::neu();
    let relay = Relay::starten(konfig, Arc::new(sink));
    let adresse = tokio::time::timeout(FRIST, relay.adresse_abwarten())
        .await
        .expect("Bind hat zu lange gedauert")
        .unwrap();
    (relay, rx, adresse)
}

/// Verbindet als Spielserver und wartet bis der Relay verbunden meldet
async fn spielserver_verbinden(relay: &RelayHandle<KanalSink>, adresse: SocketAddr) -> TcpStream {
    zustand_abwarten(relay, VerbindungsZustand::Lauschend).await;
    let stream = TcpStream::connect(adresse).await.unwrap();
    zustand_abwarten(relay, VerbindungsZustand::Verbunden).await;
    stream
}

async fn zustand_abwarten(relay: &RelayHandle<KanalSink>, ziel: VerbindungsZustand) {
    tokio::time::timeout(FRIST, relay.verbindung().zustand_abwarten(|z| *z == ziel))
        .await
        .unwrap_or_else(|_| panic!("Zustand {ziel:?} nicht erreicht"))
        .unwrap();
}

async fn naechstes_event(rx: &mut mpsc::UnboundedReceiver<SpielEvent>) -> SpielEvent {
    tokio::time::timeout(FRIST, rx.recv())
        .await
        .expect("kein Event zugestellt")
        .expect("Sink geschlossen")
}

/// Liest einen NUL-terminierten Datensatz (ohne NUL)
async fn datensatz_lesen(leser: &mut BufReader<TcpStream>) -> Option<String> {
    let mut puffer = Vec::new();
    let n = tokio::time::timeout(FRIST, leser.read_until(0, &mut puffer))
        .await
        .expect("kein Datensatz empfangen")
        .ok()?;
    if n == 0 || puffer.last() != Some(&0) {
        return None;
    }
    puffer.pop();
    Some(String::from_utf8(puffer).unwrap())
}

/// Wartet bis die Gegenseite schliesst (EOF oder Reset)
async fn geschlossen_abwarten(stream: &mut TcpStream) {
    let mut puffer = [0u8; 256];
    loop {
        match tokio::time::timeout(FRIST, stream.read(&mut puffer))
            .await
            .expect("Relay hat die Verbindung nicht geschlossen")
        {
            Ok(0) | Err(_) => return,
            Ok(_) => continue,
        }
    }
}

// ---------------------------------------------------------------------------
// Eingehend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn doppeltes_say_wird_einmal_zugestellt() {
    let (relay, mut rx, adresse) = relay_starten(konfig()).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    let datensatz = b"{\"type\":\"Say\",\"sender\":\"Alice\",\"msg\":\"hi\"}\0";
    spiel.write_all(datensatz).await.unwrap();
    spiel.write_all(datensatz).await.unwrap();
    spiel
        .write_all(b"{\"type\":\"Say\",\"sender\":\"Alice\",\"msg\":\"bye\"}\0")
        .await
        .unwrap();

    let erstes = naechstes_event(&mut rx).await;
    assert_eq!(erstes, SpielEvent::neu(EventArt::Say, "Alice", "hi"));
    assert_eq!(erstes.team_index, "-1");
    // Das Duplikat kommt nie an, das naechste Event folgt direkt
    assert_eq!(naechstes_event(&mut rx).await.nachricht, "bye");

    let statistik = relay.stoppen().await;
    assert_eq!(statistik.zugestellt, 2);
    assert_eq!(statistik.duplikate, 1);
}

#[tokio::test]
async fn events_ueber_mehrere_writes_verteilt() {
    let (relay, mut rx, adresse) = relay_starten(konfig()).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    spiel.write_all(b"  {\"type\":\"Kill\",\"sender\":\"Bob\",").await.unwrap();
    spiel.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    spiel
        .write_all(b"\"msg\":\"Bob killed Carol\",\"teamIndex\":1}\n\0{\"type\":\"MatchEnd\",\"msg\":\"Red wins\"}\0")
        .await
        .unwrap();

    let kill = naechstes_event(&mut rx).await;
    assert_eq!(kill.art, EventArt::Kill);
    assert_eq!(kill.team_index, "1");

    let ende = naechstes_event(&mut rx).await;
    assert_eq!(ende.art, EventArt::MatchEnd);
    assert_eq!(ende.sender, "Game");

    relay.stoppen().await;
}

#[tokio::test]
async fn fehlerhaftes_json_wird_uebersprungen() {
    let (relay, mut rx, adresse) = relay_starten(konfig()).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    spiel
        .write_all(b"kein json\0{\"type\":\"Say\",\"sender\":\"Alice\",\"msg\":\"ok\"}\0")
        .await
        .unwrap();

    assert_eq!(naechstes_event(&mut rx).await.nachricht, "ok");
    assert_eq!(relay.zustand(), VerbindungsZustand::Verbunden);

    let statistik = relay.stoppen().await;
    assert_eq!(statistik.frames_verworfen, 1);
}

// ---------------------------------------------------------------------------
// Verbindungs-Lebenszyklus
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_travel_fuehrt_zu_neuem_bind() {
    let (relay, mut rx, adresse) = relay_starten(konfig()).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    spiel
        .write_all(b"{\"type\":\"ServerTravel\",\"msg\":\"DM-Deck16\"}\0")
        .await
        .unwrap();

    zustand_abwarten(&relay, VerbindungsZustand::Wiederverbindend).await;
    geschlossen_abwarten(&mut spiel).await;
    zustand_abwarten(&relay, VerbindungsZustand::Lauschend).await;
    assert_eq!(relay.lokale_adresse(), Some(adresse), "Port bleibt nach Rebind gleich");

    let mut neu = spielserver_verbinden(&relay, adresse).await;
    neu.write_all(b"{\"type\":\"Say\",\"sender\":\"Alice\",\"msg\":\"zurueck\"}\0")
        .await
        .unwrap();
    assert_eq!(naechstes_event(&mut rx).await.nachricht, "zurueck");

    let statistik = relay.stoppen().await;
    assert_eq!(statistik.verbindungen, 2);
}

#[tokio::test]
async fn server_travel_wartet_vor_dem_neuen_bind() {
    let mut konfig = konfig();
    konfig.verbindung.reise_verzoegerung = Duration::from_millis(500);
    let (relay, _rx, adresse) = relay_starten(konfig).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    let start = Instant::now();
    spiel
        .write_all(b"{\"type\":\"ServerTravel\",\"msg\":\"CTF-Face\"}\0")
        .await
        .unwrap();
    zustand_abwarten(&relay, VerbindungsZustand::Wiederverbindend).await;
    geschlossen_abwarten(&mut spiel).await;

    // Waehrend der Wartezeit lauscht niemand auf dem Port
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(relay.zustand(), VerbindungsZustand::Wiederverbindend);
    assert!(TcpStream::connect(adresse).await.is_err());

    zustand_abwarten(&relay, VerbindungsZustand::Lauschend).await;
    assert!(start.elapsed() >= Duration::from_millis(500), "nach {:?} neu gebunden", start.elapsed());

    relay.stoppen().await;
}

#[tokio::test]
async fn lesefehler_fuehrt_zurueck_zum_lauschen() {
    let mut konfig = konfig();
    konfig.verbindung.max_frame_groesse = 64;
    let (relay, mut rx, adresse) = relay_starten(konfig).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    // Frame ohne NUL ueber dem Limit
    spiel.write_all(&[b'x'; 200]).await.unwrap();
    geschlossen_abwarten(&mut spiel).await;

    let mut neu = spielserver_verbinden(&relay, adresse).await;
    neu.write_all(b"{\"type\":\"FlagCap\",\"sender\":\"Eve\",\"msg\":\"Eve captured the flag\"}\0")
        .await
        .unwrap();
    assert_eq!(naechstes_event(&mut rx).await.art, EventArt::FlagCap);

    relay.stoppen().await;
}

#[tokio::test]
async fn gegenseite_schliesst_und_verbindet_neu() {
    let (relay, mut rx, adresse) = relay_starten(konfig()).await;
    let spiel = spielserver_verbinden(&relay, adresse).await;
    drop(spiel);

    let mut neu = spielserver_verbinden(&relay, adresse).await;
    neu.write_all(b"{\"type\":\"TeamSay\",\"sender\":\"Bob\",\"msg\":\"push mid\",\"teamIndex\":\"0\"}\0")
        .await
        .unwrap();
    let event = naechstes_event(&mut rx).await;
    assert_eq!(event.art, EventArt::TeamSay);
    assert_eq!(event.team_index, "0");

    relay.stoppen().await;
}

#[tokio::test]
async fn heartbeat_ohne_antwort_erzwingt_reconnect() {
    let mut konfig = konfig();
    konfig.verbindung.heartbeat_intervall = Some(Duration::from_millis(100));
    let (relay, _rx, adresse) = relay_starten(konfig).await;
    let spiel = spielserver_verbinden(&relay, adresse).await;
    let mut leser = BufReader::new(spiel);

    let ping = datensatz_lesen(&mut leser).await.expect("kein PING");
    assert_eq!(ping, "{\"type\":\"Heartbeat\",\"sender\":\"Game\",\"msg\":\"PING\"}");

    // Keine Antwort: beim naechsten Tick wird getrennt
    assert_eq!(datensatz_lesen(&mut leser).await, None);
    zustand_abwarten(&relay, VerbindungsZustand::Lauschend).await;

    relay.stoppen().await;
}

#[tokio::test]
async fn beantworteter_heartbeat_haelt_verbindung() {
    let mut konfig = konfig();
    konfig.verbindung.heartbeat_intervall = Some(Duration::from_millis(100));
    let (relay, _rx, adresse) = relay_starten(konfig).await;
    let spiel = spielserver_verbinden(&relay, adresse).await;
    let mut leser = BufReader::new(spiel);

    for _ in 0..5 {
        let ping = datensatz_lesen(&mut leser).await.expect("kein PING");
        assert!(ping.contains("PING"));
        leser
            .get_mut()
            .write_all(b"{\"type\":\"Heartbeat\",\"msg\":\"PONG\"}\0")
            .await
            .unwrap();
    }
    assert_eq!(relay.zustand(), VerbindungsZustand::Verbunden);

    let statistik = relay.stoppen().await;
    assert_eq!(statistik.verbindungen, 1);
}

/// Startet viele grosse Sendungen an einen Spielserver, der nie liest
fn sendungen_fluten(relay: &RelayHandle<KanalSink>) {
    let nachricht = "x".repeat(60_000);
    for _ in 0..400 {
        let verbindung = relay.verbindung().clone();
        let event = SpielEvent::chat("Dave", nachricht.clone());
        tokio::spawn(async move {
            let _ = verbindung.senden(event).await;
        });
    }
}

#[tokio::test]
async fn blockiertes_schreiben_erzwingt_reconnect() {
    let mut konfig = konfig();
    konfig.verbindung.heartbeat_intervall = Some(Duration::from_millis(200));
    let (relay, _rx, adresse) = relay_starten(konfig).await;
    // Bleibt offen, liest aber nie
    let _spiel = spielserver_verbinden(&relay, adresse).await;

    sendungen_fluten(&relay);

    zustand_abwarten(&relay, VerbindungsZustand::Lauschend).await;
    let statistik = tokio::time::timeout(FRIST, relay.stoppen())
        .await
        .expect("stoppen blockiert");
    assert_eq!(statistik.verbindungen, 1);
}

#[tokio::test]
async fn stoppen_bei_blockiertem_schreiben() {
    let mut konfig = konfig();
    konfig.verbindung.schreib_timeout = Duration::from_secs(60);
    let (relay, _rx, adresse) = relay_starten(konfig).await;
    let _spiel = spielserver_verbinden(&relay, adresse).await;

    sendungen_fluten(&relay);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(relay.zustand(), VerbindungsZustand::Verbunden);

    tokio::time::timeout(FRIST, relay.stoppen())
        .await
        .expect("stoppen blockiert");
}

#[tokio::test]
async fn ping_vom_spielserver_wird_mit_pong_beantwortet() {
    let (relay, mut rx, adresse) = relay_starten(konfig()).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;

    spiel
        .write_all(b"{\"type\":\"Heartbeat\",\"msg\":\"PING\"}\0")
        .await
        .unwrap();
    let mut leser = BufReader::new(spiel);
    assert_eq!(
        datensatz_lesen(&mut leser).await.as_deref(),
        Some("{\"type\":\"Heartbeat\",\"sender\":\"Game\",\"msg\":\"PONG\"}")
    );

    // Heartbeats erreichen den Chat nicht
    assert!(rx.try_recv().is_err());
    relay.stoppen().await;
}

// ---------------------------------------------------------------------------
// Ausgehend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_nachricht_wird_als_say_geschrieben() {
    let (relay, _rx, adresse) = relay_starten(konfig()).await;
    let spiel = spielserver_verbinden(&relay, adresse).await;
    let mut leser = BufReader::new(spiel);

    let ergebnis = relay
        .chat_weiterleiten(ChatNachricht::neu("Dave", "say \"hi\""))
        .await
        .unwrap();
    assert_eq!(ergebnis, AusgangsErgebnis::Gesendet);
    assert_eq!(
        datensatz_lesen(&mut leser).await.as_deref(),
        Some(r#"{"type":"Say","sender":"Dave","msg":"say \"hi\""}"#)
    );

    relay.stoppen().await;
}

#[tokio::test]
async fn echo_erreicht_den_spielserver_nie() {
    let (relay, _rx, adresse) = relay_starten(konfig()).await;
    let spiel = spielserver_verbinden(&relay, adresse).await;
    let mut leser = BufReader::new(spiel);

    let ergebnis = relay
        .chat_weiterleiten(ChatNachricht::neu("Dave", "Discord: Alice: hi"))
        .await
        .unwrap();
    assert_eq!(ergebnis, AusgangsErgebnis::EchoVerworfen);

    relay
        .chat_weiterleiten(ChatNachricht::neu("Dave", "danach"))
        .await
        .unwrap();
    // Erster Datensatz auf dem Draht ist die zweite Nachricht
    let datensatz = datensatz_lesen(&mut leser).await.unwrap();
    assert!(datensatz.contains("danach"));
    assert!(!datensatz.contains("Discord: "));

    relay.stoppen().await;
}

#[tokio::test]
async fn senden_ohne_verbindung_schlaegt_fehl() {
    let (relay, _rx, _adresse) = relay_starten(konfig()).await;
    zustand_abwarten(&relay, VerbindungsZustand::Lauschend).await;

    let fehler = relay
        .chat_weiterleiten(ChatNachricht::neu("Dave", "hallo"))
        .await
        .unwrap_err();
    assert!(matches!(fehler, utbridge_relay::RelayError::NichtVerbunden));

    let statistik = relay.stoppen().await;
    assert_eq!(statistik.ausgehend_fehler, 1);
}

#[tokio::test]
async fn senden_wartet_auf_wiederverbindung() {
    let mut konfig = konfig();
    konfig.verbindung.sende_versuche = 5;
    konfig.verbindung.sende_abstand = Duration::from_millis(500);
    let (relay, _rx, adresse) = relay_starten(konfig).await;
    zustand_abwarten(&relay, VerbindungsZustand::Lauschend).await;

    let senden = relay.chat_weiterleiten(ChatNachricht::neu("Dave", "spaet"));
    let verbinden = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        TcpStream::connect(adresse).await.unwrap()
    };
    let (ergebnis, spiel) = tokio::join!(senden, verbinden);
    assert_eq!(ergebnis.unwrap(), AusgangsErgebnis::Gesendet);

    let mut leser = BufReader::new(spiel);
    let datensatz = datensatz_lesen(&mut leser).await.unwrap();
    assert!(datensatz.contains("spaet"));

    relay.stoppen().await;
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stoppen_schliesst_socket_und_beendet_tasks() {
    let (relay, _rx, adresse) = relay_starten(konfig()).await;
    let mut spiel = spielserver_verbinden(&relay, adresse).await;
    let mut zustand = relay.verbindung().zustand_abonnieren();

    let statistik = tokio::time::timeout(FRIST, relay.stoppen())
        .await
        .expect("stoppen blockiert");
    assert_eq!(statistik.verbindungen, 1);

    geschlossen_abwarten(&mut spiel).await;
    assert_eq!(*zustand.borrow_and_update(), VerbindungsZustand::Leerlauf);
}
