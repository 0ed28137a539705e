//! Relay-Statistik – Zaehler fuer beide Richtungen
//!
//! Lock-freie Zaehler, die Verbindungs-Manager und Dispatcher aus
//! verschiedenen Tasks heraus erhoehen. `snapshot()` liefert eine
//! konsistente Momentaufnahme fuer Logging und Tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Momentaufnahme aller Zaehler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatistikSnapshot {
    /// An die Chat-Seite zugestellte Events
    pub zugestellt: u64,
    /// Als Duplikat verworfene Events
    pub duplikate: u64,
    /// Nicht zustellbare Events (unbekannte Art, Outbound-Echo)
    pub ignoriert: u64,
    /// Von der Chat-Seite abgelehnte Zustellungen
    pub sink_fehler: u64,
    /// Fehlerhafte Frames (kein UTF-8, kein JSON)
    pub frames_verworfen: u64,
    /// An den Spielserver gesendete Chat-Nachrichten
    pub ausgehend_gesendet: u64,
    /// Ausgehende Nachrichten, die wegen Echo/Bot/leer verworfen wurden
    pub ausgehend_verworfen: u64,
    /// Ausgehende Nachrichten, die nicht gesendet werden konnten
    pub ausgehend_fehler: u64,
    /// Angenommene Verbindungen des Spielservers
    pub verbindungen: u64,
}

/// Geteilte Zaehler des Relays
#[derive(Debug, Default)]
pub struct RelayStatistik {
    zugestellt: AtomicU64,
    duplikate: AtomicU64,
    ignoriert: AtomicU64,
    sink_fehler: AtomicU64,
    frames_verworfen: AtomicU64,
    ausgehend_gesendet: AtomicU64,
    ausgehend_verworfen: AtomicU64,
    ausgehend_fehler: AtomicU64,
    verbindungen: AtomicU64,
}

impl RelayStatistik {
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn zugestellt(&self) {
        self.zugestellt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn duplikat(&self) {
        self.duplikate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ignoriert(&self) {
        self.ignoriert.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_fehler(&self) {
        self.sink_fehler.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_verworfen(&self) {
        self.frames_verworfen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ausgehend_gesendet(&self) {
        self.ausgehend_gesendet.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ausgehend_verworfen(&self) {
        self.ausgehend_verworfen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ausgehend_fehler(&self) {
        self.ausgehend_fehler.fetch_add(1, Ordering::Relaxed);
    }

    pub fn verbunden(&self) {
        self.verbindungen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatistikSnapshot {
        StatistikSnapshot {
            zugestellt: self.zugestellt.load(Ordering::Relaxed),
            duplikate: self.duplikate.load(Ordering::Relaxed),
            ignoriert: self.ignoriert.load(Ordering::Relaxed),
            sink_fehler: self.sink_fehler.load(Ordering::Relaxed),
            frames_verworfen: self.frames_verworfen.load(Ordering::Relaxed),
            ausgehend_gesendet: self.ausgehend_gesendet.load(Ordering::Relaxed),
            ausgehend_verworfen: self.ausgehend_verworfen.load(Ordering::Relaxed),
            ausgehend_fehler: self.ausgehend_fehler.load(Ordering::Relaxed),
            verbindungen: self.verbindungen.load(Ordering::Relaxed),
        }
    }
}

impl StatistikSnapshot {
    /// Gibt eine lesbare Zusammenfassung zurueck
    pub fn zusammenfassung(&self) -> String {
        format!(
            "Zugestellt={} Duplikate={} Ignoriert={} SinkFehler={} FramesVerworfen={} \
             Ausgehend={} AusgehendVerworfen={} AusgehendFehler={} Verbindungen={}",
            self.zugestellt,
            self.duplikate,
            self.ignoriert,
            self.sink_fehler,
            self.frames_verworfen,
            self.ausgehend_gesendet,
            self.ausgehend_verworfen,
            self.ausgehend_fehler,
            self.verbindungen,
        )
    }
}
