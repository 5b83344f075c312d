//! Core domain + application logic for the queue-position Telegram bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the external
//! queue service live behind ports (traits) implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod lookup;
pub mod messages;
pub mod messaging;
pub mod session;

pub use errors::{Error, Result};
