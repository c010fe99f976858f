//! Shared utilities for fx-sentiment
//!
//! Logging setup and process-level configuration shared by the binaries.

pub mod config;
pub mod logging;

pub use config::{Config, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
