//! Relay-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, sodass der Relay ohne Konfigurationsdatei lauffaehig ist.
//!
//! ```toml
//! [relay]
//! host = "localhost"
//! port = 49321
//! heartbeat_sek = 30
//!
//! [cache]
//! strategie = "dauer"
//! dauer_sek = 5
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utbridge_protocol::wire::STANDARD_MAX_FRAME_GROESSE;
use utbridge_relay::dedup::STANDARD_CACHE_ANZAHL;
use utbridge_relay::dispatcher::STANDARD_ECHO_PRAEFIX;
use utbridge_relay::{DedupGrenze, DispatcherKonfig, RelayKonfig, VerbindungsKonfig};

/// Vollstaendige Konfiguration des Relays
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Spielserver-Verbindung und Ausgangsrichtung
    pub relay: RelayEinstellungen,
    /// Dedup-Cache
    pub cache: CacheEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Verbindungs- und Dispatcher-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayEinstellungen {
    /// Host, auf dem auf den Spielserver gewartet wird
    pub host: String,
    /// Port fuer die Spielserver-Verbindung
    pub port: u16,
    /// Wartezeit nach fehlgeschlagenem Bind in Sekunden
    pub bind_wiederholung_sek: u64,
    /// Wartezeit nach ServerTravel in Sekunden
    pub reise_verzoegerung_sek: u64,
    /// Heartbeat-Intervall in Sekunden (leer oder 0 = aus)
    pub heartbeat_sek: Option<u64>,
    /// Warteversuche beim Senden ohne Verbindung (0 = sofort Fehler)
    pub sende_versuche: u32,
    /// Abstand zwischen den Warteversuchen in Sekunden
    pub sende_abstand_sek: u64,
    /// Laengste Dauer eines Schreibvorgangs in Sekunden
    pub schreib_timeout_sek: u64,
    /// Ausgehende Nachrichten mit diesem Praefix werden verworfen
    pub echo_praefix: String,
    /// Event-Art in den Dedup-Fingerprint aufnehmen
    pub art_im_fingerprint: bool,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_groesse: usize,
}

impl Default for RelayEinstellungen {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 49321,
            bind_wiederholung_sek: 5,
            reise_verzoegerung_sek: 15,
            heartbeat_sek: None,
            sende_versuche: 5,
            sende_abstand_sek: 5,
            schreib_timeout_sek: 10,
            echo_praefix: STANDARD_ECHO_PRAEFIX.into(),
            art_im_fingerprint: true,
            max_frame_groesse: STANDARD_MAX_FRAME_GROESSE,
        }
    }
}

/// Begrenzungsstrategie des Dedup-Caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategie {
    /// Feste Anzahl Eintraege (FIFO)
    #[default]
    #[serde(alias = "count")]
    Anzahl,
    /// Zeitfenster
    #[serde(alias = "duration")]
    Dauer,
}

/// Dedup-Cache-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEinstellungen {
    pub strategie: CacheStrategie,
    /// Maximale Eintraege bei `strategie = "anzahl"`
    pub anzahl: usize,
    /// Zeitfenster in Sekunden bei `strategie = "dauer"`
    pub dauer_sek: u64,
}

impl Default for CacheEinstellungen {
    fn default() -> Self {
        Self {
            strategie: CacheStrategie::Anzahl,
            anzahl: STANDARD_CACHE_ANZAHL,
            dauer_sek: 5,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// EnvFilter-Direktive, z.B. "info" oder "utbridge_relay=debug"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl RelayConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die Adresse zurueck, auf der auf den Spielserver gewartet wird
    pub fn relay_adresse(&self) -> String {
        format!("{}:{}", self.relay.host, self.relay.port)
    }

    /// Prueft die Werte und baut die Konfiguration des Relay-Kerns
    pub fn relay_konfig(&self) -> Result<RelayKonfig> {
        let relay = &self.relay;
        if relay.host.trim().is_empty() {
            bail!("relay.host darf nicht leer sein");
        }
        if relay.max_frame_groesse == 0 {
            bail!("relay.max_frame_groesse muss groesser als 0 sein");
        }
        if relay.schreib_timeout_sek == 0 {
            bail!("relay.schreib_timeout_sek muss groesser als 0 sein");
        }

        let cache = match self.cache.strategie {
            CacheStrategie::Anzahl => DedupGrenze::Anzahl(self.cache.anzahl),
            CacheStrategie::Dauer => {
                if self.cache.dauer_sek == 0 {
                    bail!("cache.dauer_sek muss bei strategie = \"dauer\" groesser als 0 sein");
                }
                DedupGrenze::Dauer(Duration::from_secs(self.cache.dauer_sek))
            }
        };

        Ok(RelayKonfig {
            verbindung: VerbindungsKonfig {
                host: relay.host.clone(),
                port: relay.port,
                bind_wiederholung: Duration::from_secs(relay.bind_wiederholung_sek),
                reise_verzoegerung: Duration::from_secs(relay.reise_verzoegerung_sek),
                heartbeat_intervall: relay
                    .heartbeat_sek
                    .filter(|sek| *sek > 0)
                    .map(Duration::from_secs),
                sende_versuche: relay.sende_versuche,
                sende_abstand: Duration::from_secs(relay.sende_abstand_sek),
                schreib_timeout: Duration::from_secs(relay.schreib_timeout_sek),
                max_frame_groesse: relay.max_frame_groesse,
                ..VerbindungsKonfig::default()
            },
            cache,
            dispatcher: DispatcherKonfig {
                echo_praefix: relay.echo_praefix.clone(),
                art_im_fingerprint: relay.art_im_fingerprint,
            },
        })
    }
}
