//! Observability for the kiosk binary.
//!
//! The engine logs through `tracing`; this module decides where those
//! events go.

pub mod logging;

pub use logging::{LogFormat, init_logging};
