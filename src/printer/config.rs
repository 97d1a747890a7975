//! # Printer Configuration
//!
//! This module defines the print heads a graphic field can be targeted at.
//!
//! ## Built-in Profiles
//!
//! | Key | Resolution | Dots/mm | Print width |
//! |-----|------------|---------|-------------|
//! | `zebra-203` | 203 DPI | 8 | 832 dots (104mm) |
//! | `zebra-300` | 300 DPI | 12 | 1248 dots (104mm) |
//! | `zebra-600` | 600 DPI | 24 | 2400 dots (101.6mm) |
//!
//! ## Usage
//!
//! ```
//! use zplgfa::printer::PrinterConfig;
//!
//! let config = PrinterConfig::by_name("zebra-300").unwrap();
//! assert_eq!(config.dpi, 300);
//! println!("Print width: {} dots", config.width_dots);
//! ```

use serde::Serialize;

/// # Printer Configuration
///
/// Defines the hardware characteristics of a thermal label printer head.
///
/// - **dpi**: the target resolution graphics are rescaled to
/// - **width_dots**: maximum printable width, informational only; graphic
///   fields wider than the head are not rejected
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrinterConfig {
    /// Lookup key used by the CLI and HTTP API
    pub key: &'static str,

    /// Printer model name
    pub name: &'static str,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Maximum print width in dots
    pub width_dots: u16,
}

impl PrinterConfig {
    /// 8 dots/mm head (ZD420, ZT230, GK420d class).
    pub const ZEBRA_203: Self = Self {
        key: "zebra-203",
        name: "Zebra 203 DPI (8 dpmm)",
        dpi: 203,
        width_dots: 832,
    };

    /// 12 dots/mm head (ZT410 300dpi, ZD620 300dpi class).
    pub const ZEBRA_300: Self = Self {
        key: "zebra-300",
        name: "Zebra 300 DPI (12 dpmm)",
        dpi: 300,
        width_dots: 1248,
    };

    /// 24 dots/mm head (ZT410 600dpi class).
    pub const ZEBRA_600: Self = Self {
        key: "zebra-600",
        name: "Zebra 600 DPI (24 dpmm)",
        dpi: 600,
        width_dots: 2400,
    };

    /// All built-in profiles, lowest resolution first.
    pub const BUILT_IN: [Self; 3] = [Self::ZEBRA_203, Self::ZEBRA_300, Self::ZEBRA_600];

    /// Look up a built-in profile by key (case-insensitive).
    ///
    /// Bare resolutions (`"203"`, `"300"`, `"600"`) are accepted too.
    pub fn by_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::BUILT_IN
            .into_iter()
            .find(|p| p.key == name || p.dpi.to_string() == name)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::ZEBRA_300
    }
}

// ============================================================================
// TESTS
// ============================================================================
