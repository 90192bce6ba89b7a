//! Library entry point for the linkmgmt client.
//!
//! The interactive flow engine lives in [`tui`]; the other modules are the
//! actors and clients it runs on.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod fs;
pub mod log;
pub mod net;
pub mod scraper;
pub mod terminal;
pub mod tui;
pub mod utils;

pub use utils::*;

/// Capacity of the bounded channels between actors.
pub const BUFFER_SIZE: usize = 128;
