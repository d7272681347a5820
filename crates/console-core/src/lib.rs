//! Shared domain types for the proxy console.
//!
//! Holds the session/credential data model, the threat classifier, the
//! console-wide error type, command-line settings and display formatting
//! helpers. Everything here is free of I/O scheduling concerns; the runtime
//! and UI crates build on top of it.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod threat;
