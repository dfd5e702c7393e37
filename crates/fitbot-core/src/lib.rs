//! Core domain + application logic for the fitness club bot.
//!
//! This crate is framework-agnostic. Telegram and the commands HTTP API live
//! behind ports (traits) implemented in adapter crates.

pub mod app;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod lead;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod workout;

pub use errors::{Error, Result};
