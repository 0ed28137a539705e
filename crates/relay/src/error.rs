//! Fehlertypen fuer den Relay-Kern

use thiserror::Error;
use utbridge_protocol::CodecError;

/// Fehlertyp fuer den Relay-Kern
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (Bind, Accept, Lesen, Schreiben)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Datensatz konnte nicht kodiert werden
    #[error("Codec-Fehler: {0}")]
    Codec(#[from] CodecError),

    /// Kein Spielserver verbunden (auch nach allen Warteversuchen)
    #[error("Nicht mit dem Spielserver verbunden")]
    NichtVerbunden,

    /// Die Ausgangsseite (Chat-Plattform) hat die Zustellung abgelehnt
    #[error("Zustellung fehlgeschlagen: {0}")]
    Zustellung(String),

    /// Der Relay wurde bereits gestoppt
    #[error("Relay gestoppt")]
    Gestoppt,
}

impl RelayError {
    /// Erstellt einen Zustellungsfehler
    pub fn zustellung(msg: impl Into<String>) -> Self {
        Self::Zustellung(msg.into())
    }
}

/// Result-Typ fuer den Relay-Kern
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        assert_eq!(
            RelayError::NichtVerbunden.to_string(),
            "Nicht mit dem Spielserver verbunden"
        );
        assert_eq!(
            RelayError::zustellung("Kanal fehlt").to_string(),
            "Zustellung fehlgeschlagen: Kanal fehlt"
        );
    }
}
