//! # Printer Module
//!
//! This module provides printer-specific configurations.
//!
//! ## Modules
//!
//! - [`config`]: Print head resolutions and widths

pub mod config;

pub use config::PrinterConfig;
