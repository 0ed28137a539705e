//! Fehlertypen fuer das Wire-Protokoll

use thiserror::Error;

/// Fehler beim Kodieren oder Dekodieren eines Frames
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Frame ist kein gueltiges UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame zu gross: {groesse} Bytes (Maximum: {max} Bytes)")]
    FrameZuGross { groesse: usize, max: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;
