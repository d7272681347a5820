//! Runtime layer for the proxy console.
//!
//! Mirrors the backend's sessions and credentials in a [`store::StateStore`],
//! keeps it fresh with a scheduled [`poller::Poller`], and applies operator
//! commands through the [`dispatcher::ActionDispatcher`]. All shared state
//! flows through one [`state::StateHandle`].

pub mod backend;
pub mod dispatcher;
pub mod poller;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use console_core as core;
