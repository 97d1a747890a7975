//! # ZPL Label Commands
//!
//! The handful of ZPL II format commands needed to place a graphic field on
//! a label.
//!
//! ## Command Structure
//!
//! ZPL commands are plain ASCII. Each starts with a caret and a two letter
//! mnemonic, followed by comma separated parameters:
//!
//! ```text
//! ^XA                  start of label format
//! ^FO50,80             field origin, dots from the top-left corner
//! ^GFA,...,...^FS      field data, closed by the field separator
//! ^XZ                  end of label format
//! ```
//!
//! ## Reference
//!
//! Based on the "ZPL II Programming Guide" by Zebra Technologies.

/// `^XA` - Start Format. Opens a label.
pub const START_FORMAT: &str = "^XA";

/// `^XZ` - End Format. Closes a label and prints it.
pub const END_FORMAT: &str = "^XZ";

/// `^FS` - Field Separator. Closes the current field.
pub const FIELD_SEPARATOR: &str = "^FS";

/// `^GF` - Graphic Field. Followed by the data format letter.
pub const GRAPHIC_FIELD: &str = "^GF";

/// # Field Origin (^FOx,y)
///
/// Sets the top-left corner of the next field, in dots, relative to the
/// label home position.
///
/// ## Example
///
/// ```
/// use zplgfa::protocol::commands;
///
/// assert_eq!(commands::field_origin(0, 0), "^FO0,0");
/// assert_eq!(commands::field_origin(50, 120), "^FO50,120");
/// ```
#[inline]
pub fn field_origin(x: u32, y: u32) -> String {
    format!("^FO{},{}", x, y)
}

/// # Complete Label (^XA ... ^XZ)
///
/// Wraps one field in a printable label format:
///
/// ```text
/// ^XA
/// ^FOx,y<field>
/// ^XZ
/// ```
///
/// `field` must carry its own `^FS`.
///
/// ## Example
///
/// ```
/// use zplgfa::protocol::commands;
///
/// let zpl = commands::label((10, 20), "^GFA,1,1,1,!^FS");
/// assert_eq!(zpl, "^XA\n^FO10,20^GFA,1,1,1,!^FS\n^XZ\n");
/// ```
pub fn label(origin: (u32, u32), field: &str) -> String {
    let (x, y) = origin;
    let mut out = String::with_capacity(field.len() + 24);
    out.push_str(START_FORMAT);
    out.push('\n');
    out.push_str(&field_origin(x, y));
    out.push_str(field);
    out.push('\n');
    out.push_str(END_FORMAT);
    out.push('\n');
    out
}
