//! Litro - interactive Tamil text-to-speech client
//!
//! A terminal client for a remote Tamil TTS backend. Text can be spoken
//! through the platform's local speech synthesis (after server-side
//! pronunciation preprocessing) or rendered to audio by the server and
//! played back locally.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod playback;
pub mod speech;
pub mod ui;

pub use error::{LitroError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "litro";
