//! Dedup-Cache – Unterdrueckt mehrfach zugestellte Events
//!
//! Der Spielserver schickt denselben Datensatz gelegentlich mehrfach (z.B.
//! einmal pro Zuschauer-Client). Der Cache merkt sich die Fingerprints
//! kuerzlich gesehener Events und meldet Wiederholungen als Duplikat.
//!
//! ## Begrenzung
//! Pro Cache ist genau eine Strategie aktiv:
//! - `DedupGrenze::Anzahl(n)`: FIFO, der aelteste Eintrag faellt heraus
//! - `DedupGrenze::Dauer(d)`: jeder Aufruf entfernt alle Eintraege aelter
//!   als `d`
//!
//! Ein Treffer frischt den Eintrag nicht auf.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use utbridge_protocol::{EventArt, SpielEvent};

/// Standard-Cachegroesse
pub const STANDARD_CACHE_ANZAHL: usize = 100;

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Dedup-Schluessel eines Events
///
/// Mit `art = None` kollidieren verschiedene Event-Arten mit gleichem
/// Sender und Text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    art: Option<EventArt>,
    sender: String,
    nachricht: String,
}

impl Fingerprint {
    /// Fingerprint nur aus Sender und Text
    pub fn neu(sender: impl Into<String>, nachricht: impl Into<String>) -> Self {
        Self {
            art: None,
            sender: sender.into(),
            nachricht: nachricht.into(),
        }
    }

    /// Leitet den Fingerprint eines Events ab
    pub fn aus_event(event: &SpielEvent, mit_art: bool) -> Self {
        Self {
            art: mit_art.then_some(event.art),
            sender: event.sender.clone(),
            nachricht: event.nachricht.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// DedupCache
// ---------------------------------------------------------------------------

/// Begrenzung des Caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupGrenze {
    /// Hoechstens so viele Eintraege
    Anzahl(usize),
    /// Eintraege verfallen nach dieser Dauer
    Dauer(Duration),
}

impl Default for DedupGrenze {
    fn default() -> Self {
        Self::Anzahl(STANDARD_CACHE_ANZAHL)
    }
}

#[derive(Debug, Default)]
struct DedupInner {
    /// Eintraege in Einfuegereihenfolge (aeltester vorne)
    reihenfolge: VecDeque<(Fingerprint, Instant)>,
    bekannt: HashSet<Fingerprint>,
}

impl DedupInner {
    fn aeltesten_entfernen(&mut self) {
        if let Some((fingerprint, _)) = self.reihenfolge.pop_front() {
            self.bekannt.remove(&fingerprint);
        }
    }
}

/// Thread-sicherer Cache kuerzlich gesehener Fingerprints
#[derive(Debug)]
pub struct DedupCache {
    grenze: DedupGrenze,
    inner: Mutex<DedupInner>,
}

impl DedupCache {
    pub fn neu(grenze: DedupGrenze) -> Self {
        Self {
            grenze,
            inner: Mutex::new(DedupInner::default()),
        }
    }

    pub fn grenze(&self) -> DedupGrenze {
        self.grenze
    }

    /// Prueft den Fingerprint und merkt ihn sich, falls er neu ist
    ///
    /// Gibt `true` zurueck wenn der Fingerprint bereits bekannt war (Duplikat).
    /// Pruefen und Eintragen passieren unter demselben Lock.
    pub fn pruefen_und_merken(&self, fingerprint: Fingerprint) -> bool {
        let mut inner = self.inner.lock();
        // Zeitpunkt unter dem Lock nehmen, damit die Reihenfolge monoton bleibt
        self.pruefen_und_merken_gesperrt(&mut inner, fingerprint, Instant::now())
    }

    fn pruefen_und_merken_gesperrt(
        &self,
        inner: &mut DedupInner,
        fingerprint: Fingerprint,
        jetzt: Instant,
    ) -> bool {
        if let DedupGrenze::Dauer(dauer) = self.grenze {
            while inner
                .reihenfolge
                .front()
                .is_some_and(|(_, zeit)| jetzt.saturating_duration_since(*zeit) >= dauer)
            {
                inner.aeltesten_entfernen();
            }
        }

        if inner.bekannt.contains(&fingerprint) {
            return true;
        }

        inner.bekannt.insert(fingerprint.clone());
        inner.reihenfolge.push_back((fingerprint, jetzt));

        if let DedupGrenze::Anzahl(max) = self.grenze {
            while inner.reihenfolge.len() > max {
                inner.aeltesten_entfernen();
            }
        }

        false
    }

    /// Anzahl aktuell gemerkter Fingerprints
    pub fn laenge(&self) -> usize {
        self.inner.lock().reihenfolge.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.laenge() == 0
    }
}
