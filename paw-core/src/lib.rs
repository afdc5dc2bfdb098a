//! paw-core: shared plumbing for the Pawsitive operational crates.
//!
//! The cache, queue and metrics crates all read their settings from a
//! [`PawConfigSnapshot`] and log through `tracing`. This crate owns both.

pub mod config;
pub mod telemetry;

pub use config::{PawConfig, PawConfigSnapshot};
pub use telemetry::{try_init_tracing, LogFormat};
