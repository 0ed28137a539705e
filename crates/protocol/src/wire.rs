//! Wire-Format der Spielserver-Verbindung
//!
//! Textbasiertes Protokoll: UTF-8 JSON-Datensaetze, getrennt durch ein
//! einzelnes NUL-Byte.
//!
//! ## Frame-Format
//!
//! ```text
//! {"type":"Say",...}\0{"type":"Kill",...}\0
//! +------ Frame ----+  +------ Frame -----+
//! ```
//!
//! Aufgeteilt in zwei Schichten:
//! - `NulFrameCodec` sammelt Bytes ueber mehrere Reads hinweg und liefert
//!   rohe Segmente bis zum naechsten NUL (die Pufferung gehoert der
//!   Verbindung, nicht der Dekodierung).
//! - `segment_dekodieren` / `event_kodieren` sind zustandslos und pur.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{CodecError, CodecResult};
use crate::event::SpielEvent;

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Frame-Trennzeichen
pub const TRENNZEICHEN: u8 = 0;

/// Standard-maximale Frame-Groesse (64 KB)
pub const STANDARD_MAX_FRAME_GROESSE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Zustandslose Kodierung
// ---------------------------------------------------------------------------

/// Dekodiert ein einzelnes Segment (ohne Trennzeichen) zu einem Event
///
/// Whitespace am Anfang und Ende wird entfernt. Ein leeres Segment ergibt
/// `Ok(None)`.
pub fn segment_dekodieren(segment: &[u8]) -> CodecResult<Option<SpielEvent>> {
    let text = std::str::from_utf8(segment)?.trim();
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(text)?))
}

/// Kodiert ein Event als JSON-Objekt plus abschliessendem NUL-Byte
///
/// serde_json escaped Anfuehrungszeichen und alle Steuerzeichen (auch NUL
/// als `\u0000`), ein Feldinhalt kann die Framing-Grenzen also nicht
/// verschieben.
pub fn event_kodieren(event: &SpielEvent) -> CodecResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec(event)?;
    bytes.push(TRENNZEICHEN);
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// NulFrameCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer den NUL-getrennten Event-Strom
///
/// Der Decoder liefert rohe Segmente; Dekodierung und Verwerfen
/// fehlerhafter Datensaetze uebernimmt der Aufrufer via
/// `segment_dekodieren`. Der Encoder schreibt vollstaendige Events.
#[derive(Debug, Clone)]
pub struct NulFrameCodec {
    /// Maximale Groesse eines noch nicht abgeschlossenen Frames
    max_frame_groesse: usize,
    /// Bis hierhin wurde der Puffer bereits nach NUL durchsucht
    gesucht_bis: usize,
}

impl NulFrameCodec {
    /// Erstellt einen Codec mit Standard-Limit
    pub fn new() -> Self {
        Self::with_max_size(STANDARD_MAX_FRAME_GROESSE)
    }

    /// Erstellt einen Codec mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_groesse: usize) -> Self {
        Self {
            max_frame_groesse,
            gesucht_bis: 0,
        }
    }

    pub fn max_frame_groesse(&self) -> usize {
        self.max_frame_groesse
    }
}

impl Default for NulFrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NulFrameCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Nur den neu hinzugekommenen Teil durchsuchen
        let start = self.gesucht_bis.min(src.len());
        match src[start..].iter().position(|b| *b == TRENNZEICHEN) {
            Some(offset) => {
                let ende = start + offset;
                let segment = src.split_to(ende).freeze();
                src.advance(1);
                self.gesucht_bis = 0;
                Ok(Some(segment))
            }
            None => {
                if src.len() > self.max_frame_groesse {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        CodecError::FrameZuGross {
                            groesse: src.len(),
                            max: self.max_frame_groesse,
                        },
                    ));
                }
                self.gesucht_bis = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(segment) = self.decode(src)? {
            return Ok(Some(segment));
        }
        // Rest ohne abschliessendes NUL als letztes Segment liefern
        self.gesucht_bis = 0;
        if src.is_empty() {
            Ok(None)
        } else {
            Ok(Some(src.split().freeze()))
        }
    }
}

/// Fehler beim Kodieren bleiben als `CodecError` erhalten, damit der
/// Aufrufer ein abgelehntes Event von einem IO-Fehler unterscheiden kann.
impl Encoder<SpielEvent> for NulFrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: SpielEvent, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = event_kodieren(&item)?;

        // Ohne Trennzeichen gerechnet, wie beim Dekodieren
        let groesse = bytes.len() - 1;
        if groesse > self.max_frame_groesse {
            return Err(CodecError::FrameZuGross {
                groesse,
                max: self.max_frame_groesse,
            });
        }

        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
