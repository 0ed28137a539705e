//! Event-Modell des Spielserver-Protokolls
//!
//! Ein `SpielEvent` ist ein einzelner JSON-Datensatz aus dem Event-Strom des
//! Spielservers (Chat, Kill, Flaggen-Eroberung, Match-Ende, Heartbeat,
//! ServerTravel) oder ein vom Relay erzeugter ausgehender Datensatz.
//!
//! ## Wire-Schema
//!
//! ```text
//! {"type": "Say", "sender": "Alice", "msg": "hi", "teamIndex": "-1"}
//! ```
//!
//! - `sender` fehlt oder ist `null` -> `"Game"`
//! - `teamIndex` fehlt -> `"-1"` (kein Team); Zahl oder String erlaubt
//! - unbekannte `type`-Werte werden als `EventArt::Unbekannt` dekodiert
//!   und sind kein Fehler

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Sender fuer Events ohne `sender`-Feld
pub const STANDARD_SENDER: &str = "Game";

/// Team-Index fuer "kein Team"
pub const KEIN_TEAM: &str = "-1";

/// Heartbeat-Anfrage
pub const HEARTBEAT_PING: &str = "PING";

/// Heartbeat-Antwort
pub const HEARTBEAT_PONG: &str = "PONG";

// ---------------------------------------------------------------------------
// EventArt
// ---------------------------------------------------------------------------

/// Art eines Events (`type`-Feld auf dem Wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventArt {
    /// Oeffentlicher Chat
    Say,
    /// Team-Chat
    TeamSay,
    Kill,
    /// Flaggen-Eroberung
    FlagCap,
    MatchEnd,
    /// Liveness-Ping/Pong (`msg` = `PING`/`PONG`)
    Heartbeat,
    /// Spielserver wechselt die Map und trennt gleich die Verbindung
    ServerTravel,
    /// Vom Relay selbst erzeugter Datensatz. `Discord` ist der historische
    /// Typname des Bots und wird beim Lesen ebenfalls akzeptiert.
    #[serde(alias = "Discord")]
    Outbound,
    /// Jeder andere `type`-Wert
    #[serde(other)]
    Unbekannt,
}

impl EventArt {
    /// Gibt den Wire-Namen zurueck
    pub fn name(&self) -> &'static str {
        match self {
            Self::Say => "Say",
            Self::TeamSay => "TeamSay",
            Self::Kill => "Kill",
            Self::FlagCap => "FlagCap",
            Self::MatchEnd => "MatchEnd",
            Self::Heartbeat => "Heartbeat",
            Self::ServerTravel => "ServerTravel",
            Self::Outbound => "Outbound",
            Self::Unbekannt => "Unbekannt",
        }
    }

    /// Protokoll-Signale, die der Verbindungs-Manager selbst verarbeitet
    pub fn ist_steuerung(&self) -> bool {
        matches!(self, Self::Heartbeat | Self::ServerTravel)
    }

    /// Arten, die an den Chat weitergeleitet werden
    pub fn ist_zustellbar(&self) -> bool {
        matches!(
            self,
            Self::Say | Self::TeamSay | Self::Kill | Self::FlagCap | Self::MatchEnd
        )
    }
}

impl std::fmt::Display for EventArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// SpielEvent
// ---------------------------------------------------------------------------

/// Ein dekodierter Datensatz des Event-Stroms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpielEvent {
    #[serde(rename = "type")]
    pub art: EventArt,
    #[serde(default = "standard_sender", deserialize_with = "sender_lesen")]
    pub sender: String,
    #[serde(rename = "msg", default)]
    pub nachricht: String,
    #[serde(
        rename = "teamIndex",
        default = "kein_team",
        deserialize_with = "team_index_lesen",
        skip_serializing_if = "ist_kein_team"
    )]
    pub team_index: String,
}

impl SpielEvent {
    /// Erstellt ein Event ohne Team-Zuordnung
    pub fn neu(art: EventArt, sender: impl Into<String>, nachricht: impl Into<String>) -> Self {
        Self {
            art,
            sender: sender.into(),
            nachricht: nachricht.into(),
            team_index: KEIN_TEAM.to_string(),
        }
    }

    /// Setzt den Team-Index
    pub fn mit_team(mut self, team_index: impl Into<String>) -> Self {
        self.team_index = team_index.into();
        self
    }

    /// Chat-Zeile in Richtung Spielserver
    pub fn chat(sender: impl Into<String>, nachricht: impl Into<String>) -> Self {
        Self::neu(EventArt::Say, sender, nachricht)
    }

    /// Heartbeat-Anfrage des Relays
    pub fn ping() -> Self {
        Self::neu(EventArt::Heartbeat, STANDARD_SENDER, HEARTBEAT_PING)
    }

    /// Heartbeat-Antwort des Relays
    pub fn pong() -> Self {
        Self::neu(EventArt::Heartbeat, STANDARD_SENDER, HEARTBEAT_PONG)
    }

    /// True fuer einen Heartbeat mit `msg = "PING"`
    pub fn ist_ping(&self) -> bool {
        self.art == EventArt::Heartbeat && self.nachricht == HEARTBEAT_PING
    }

    /// True wenn das Event keinem Team zugeordnet ist
    pub fn ohne_team(&self) -> bool {
        ist_kein_team(&self.team_index)
    }
}

// ---------------------------------------------------------------------------
// Serde-Hilfsfunktionen
// ---------------------------------------------------------------------------

fn standard_sender() -> String {
    STANDARD_SENDER.to_string()
}

fn kein_team() -> String {
    KEIN_TEAM.to_string()
}

fn ist_kein_team(team_index: &str) -> bool {
    team_index == KEIN_TEAM
}

fn sender_lesen<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let sender: Option<String> = Option::deserialize(deserializer)?;
    Ok(sender.unwrap_or_else(standard_sender))
}

/// Spielserver senden den Team-Index mal als String, mal als Zahl
#[derive(Deserialize)]
#[serde(untagged)]
enum TeamIndexWire {
    Text(String),
    Zahl(i64),
}

fn team_index_lesen<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let wert: Option<TeamIndexWire> = Option::deserialize(deserializer)?;
    Ok(match wert {
        Some(TeamIndexWire::Text(text)) => text,
        Some(TeamIndexWire::Zahl(zahl)) => zahl.to_string(),
        None => kein_team(),
    })
}
