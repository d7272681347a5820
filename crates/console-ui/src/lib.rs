//! Terminal UI layer for the proxy console.
//!
//! Provides themes, the header and indicator components, the sessions and
//! credentials tables, the session detail popup, and the application event
//! loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod credential_view;
pub mod session_view;
pub mod themes;

pub use console_core as core;
