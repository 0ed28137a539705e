//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Config-Datei):
//! - `UTB_LOG_LEVEL`: EnvFilter-Direktive (z.B. `info`, `utbridge_relay=debug`)
//! - `UTB_LOG_FORMAT`: Format (text/json), Standard: text

use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Umgebungsvariable fuer den Log-Filter
pub const ENV_LOG_LEVEL: &str = "UTB_LOG_LEVEL";
/// Umgebungsvariable fuer das Log-Format
pub const ENV_LOG_FORMAT: &str = "UTB_LOG_FORMAT";

/// Fehler beim Initialisieren des Loggings
#[derive(Debug, Error)]
pub enum LoggingFehler {
    #[error("Unbekanntes Log-Format: {0} (erlaubt: text, json)")]
    UnbekanntesFormat(String),

    #[error("Ungueltiger Log-Filter '{filter}': {grund}")]
    UngueltigerFilter { filter: String, grund: String },

    #[error("Logging bereits initialisiert")]
    BereitsInitialisiert,
}

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingFehler;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            andere => Err(LoggingFehler::UnbekanntesFormat(andere.to_string())),
        }
    }
}

/// Waehlt den Wert aus der Umgebung, falls gesetzt und nicht leer
fn mit_env_vorrang(env_wert: Option<String>, konfig_wert: &str) -> String {
    env_wert
        .filter(|wert| !wert.trim().is_empty())
        .unwrap_or_else(|| konfig_wert.to_string())
}

/// Initialisiert das Logging-System.
///
/// `level` und `format` kommen aus der Config-Datei; `UTB_LOG_LEVEL` und
/// `UTB_LOG_FORMAT` ueberschreiben sie.
pub fn logging_initialisieren(level: &str, format: &str) -> Result<(), LoggingFehler> {
    let level = mit_env_vorrang(std::env::var(ENV_LOG_LEVEL).ok(), level);
    let format: LogFormat = mit_env_vorrang(std::env::var(ENV_LOG_FORMAT).ok(), format).parse()?;

    let filter = EnvFilter::try_new(&level).map_err(|e| LoggingFehler::UngueltigerFilter {
        filter: level.clone(),
        grund: e.to_string(),
    })?;

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    ergebnis.map_err(|_| LoggingFehler::BereitsInitialisiert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parsen() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" json ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LoggingFehler::UnbekanntesFormat(_))
        ));
    }

    #[test]
    fn umgebung_hat_vorrang() {
        assert_eq!(mit_env_vorrang(Some("debug".into()), "info"), "debug");
        assert_eq!(mit_env_vorrang(None, "info"), "info");
        // Leere Variable zaehlt als nicht gesetzt
        assert_eq!(mit_env_vorrang(Some("  ".into()), "warn"), "warn");
    }

    #[test]
    fn standard_format_ist_text() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
