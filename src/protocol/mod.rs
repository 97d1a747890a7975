//! # ZPL Protocol Implementation
//!
//! Builders and parsers for the parts of the ZPL II language used to ship a
//! bitmap to a label printer.
//!
//! ## Module Structure
//!
//! - [`commands`]: Label format commands (`^XA`, `^FO`, `^FS`, `^XZ`)
//! - [`graphic_field`]: The `^GFA` graphic field, encode and parse
//! - [`compress`]: Run-length compressed hex
//! - [`z64`]: zlib/base64 field data
//!
//! ## Usage Example
//!
//! ```
//! use zplgfa::protocol::{commands, graphic_field::{self, GraphicEncoding}};
//! use zplgfa::render::bitmap::MonochromeBitmap;
//!
//! let bitmap = MonochromeBitmap::from_fn(32, 32, |x, y| (x / 4 + y / 4) % 2 == 0);
//! let field = graphic_field::encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
//!
//! let zpl = commands::label((0, 0), &field.to_string());
//! assert!(zpl.starts_with("^XA"));
//! ```
//!
//! ## Protocol Reference
//!
//! Based on the "ZPL II Programming Guide" by Zebra Technologies.

pub mod commands;
pub mod compress;
pub mod graphic_field;
pub mod z64;
