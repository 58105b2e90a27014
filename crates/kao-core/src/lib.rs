//! Core domain + application logic for the kaomoji bot.
//!
//! This crate is transport-agnostic. The chat platform, the edit endpoint and the
//! credential table live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod kaomoji;
pub mod logging;
pub mod messaging;
pub mod replies;
pub mod substitution;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
