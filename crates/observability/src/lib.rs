//! # utbridge-observability
//!
//! Structured Logging fuer den Relay via tracing-subscriber
//! (Text oder JSON, Level per EnvFilter).

pub mod logging;

pub use logging::{LogFormat, LoggingFehler, logging_initialisieren};
