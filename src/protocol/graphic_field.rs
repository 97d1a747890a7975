//! # Graphic Field (^GFA)
//!
//! Embeds a monochrome bitmap in a label.
//!
//! ## Protocol Details
//!
//! ```text
//! ^GFA,b,c,d,data^FS
//! ```
//!
//! | Parameter | Meaning |
//! |-----------|---------|
//! | `A` | data format: ASCII (hex, compressed hex or Z64) |
//! | `b` | byte count of the field; equal to `c` for ASCII data |
//! | `c` | total bytes of the uncompressed bitmap (`d` × rows) |
//! | `d` | bytes per row, `ceil(width / 8)` |
//! | `data` | the encoded bitmap |
//!
//! The printer uses `c` and `d` to know where the data ends and how rows
//! wrap, so both must describe the uncompressed bitmap exactly.
//!
//! ## Data Encodings
//!
//! | Encoding | Example data | Notes |
//! |----------|--------------|-------|
//! | [`GraphicEncoding::Hex`] | `FF00FF00` | two hex digits per byte |
//! | [`GraphicEncoding::CompressedHex`] | `!,:` | run-length letters, see [`compress`](super::compress) |
//! | [`GraphicEncoding::Z64`] | `:Z64:eJz...:1A2B` | zlib + base64, see [`z64`](super::z64) |
//!
//! ## Example
//!
//! ```
//! use zplgfa::protocol::graphic_field::{self, GraphicEncoding};
//! use zplgfa::render::bitmap::MonochromeBitmap;
//!
//! // 16x3: a black top row, then two white rows
//! let bitmap = MonochromeBitmap::from_fn(16, 3, |_, y| y == 0);
//! let field = graphic_field::encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
//!
//! assert_eq!(field.to_string(), "^GFA,6,6,2,!,:^FS");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::commands::{FIELD_SEPARATOR, GRAPHIC_FIELD};
use super::{compress, z64};
use crate::error::ZplError;
use crate::render::bitmap::MonochromeBitmap;

/// Largest value the byte count parameters may carry.
pub const MAX_FIELD_BYTES: u64 = u32::MAX as u64;

/// How the bitmap bytes are written into the field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum GraphicEncoding {
    /// Plain uppercase hex
    Hex,
    /// Run-length compressed hex
    #[default]
    #[serde(alias = "compressed")]
    #[value(alias = "compressed")]
    CompressedHex,
    /// zlib + base64 with CRC
    Z64,
}

/// The size parameters of a graphic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicFieldHeader {
    /// Total uncompressed bytes (`c`)
    pub total_bytes: u32,
    /// Bytes per row (`d`)
    pub bytes_per_row: u32,
}

impl GraphicFieldHeader {
    /// Header for a `width` x `height` pixel bitmap.
    ///
    /// Fails with [`ZplError::EncodingOverflow`] when the byte counts do not
    /// fit the header fields.
    ///
    /// ```
    /// use zplgfa::protocol::graphic_field::GraphicFieldHeader;
    ///
    /// let header = GraphicFieldHeader::for_dimensions(300, 300).unwrap();
    /// assert_eq!(header.bytes_per_row, 38);
    /// assert_eq!(header.total_bytes, 38 * 300);
    /// ```
    pub fn for_dimensions(width: usize, height: usize) -> Result<Self, ZplError> {
        let bytes_per_row = width.div_ceil(8);
        let overflow = || ZplError::EncodingOverflow {
            bytes_per_row,
            rows: height,
            limit: MAX_FIELD_BYTES,
        };

        let total = (bytes_per_row as u64)
            .checked_mul(height as u64)
            .filter(|&total| total <= MAX_FIELD_BYTES)
            .ok_or_else(overflow)?;

        Ok(Self {
            total_bytes: u32::try_from(total).map_err(|_| overflow())?,
            bytes_per_row: u32::try_from(bytes_per_row).map_err(|_| overflow())?,
        })
    }

    /// Number of rows the header describes.
    pub fn rows(&self) -> u32 {
        self.total_bytes.checked_div(self.bytes_per_row).unwrap_or(0)
    }
}

/// A rendered `^GFA` field. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedGraphicField {
    header: GraphicFieldHeader,
    encoding: GraphicEncoding,
    data: String,
}

impl EncodedGraphicField {
    pub fn header(&self) -> GraphicFieldHeader {
        self.header
    }

    pub fn encoding(&self) -> GraphicEncoding {
        self.encoding
    }

    /// The encoded bitmap, without header or terminator.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for EncodedGraphicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}A,{},{},{},{}{}",
            GRAPHIC_FIELD,
            self.header.total_bytes,
            self.header.total_bytes,
            self.header.bytes_per_row,
            self.data,
            FIELD_SEPARATOR
        )
    }
}

/// Encode a bitmap as a graphic field.
pub fn encode(bitmap: &MonochromeBitmap, encoding: GraphicEncoding) -> Result<EncodedGraphicField, ZplError> {
    let header = GraphicFieldHeader::for_dimensions(bitmap.width(), bitmap.height())?;

    let data = if bitmap.total_bytes() == 0 {
        String::new()
    } else {
        match encoding {
            GraphicEncoding::Hex => compress::to_hex(bitmap.as_bytes()),
            GraphicEncoding::CompressedHex => compress::compress(bitmap.as_bytes(), bitmap.bytes_per_row()),
            GraphicEncoding::Z64 => z64::encode(bitmap.as_bytes())?,
        }
    };

    debug!(
        total_bytes = header.total_bytes,
        bytes_per_row = header.bytes_per_row,
        ?encoding,
        encoded_len = data.len(),
        "Encoded graphic field"
    );

    Ok(EncodedGraphicField {
        header,
        encoding,
        data,
    })
}

/// A graphic field read back from ZPL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGraphicField {
    pub header: GraphicFieldHeader,
    pub encoding: GraphicEncoding,
    /// Uncompressed packed rows
    pub bytes: Vec<u8>,
}

impl ParsedGraphicField {
    /// The field as a bitmap. Width is `bytes_per_row * 8`; the true pixel
    /// width is not carried by the format.
    pub fn to_bitmap(&self) -> Result<MonochromeBitmap, ZplError> {
        MonochromeBitmap::from_packed(
            self.header.bytes_per_row as usize * 8,
            self.header.rows() as usize,
            self.bytes.clone(),
        )
    }
}

/// Find the first `^GFA` field in ZPL text and decode its bitmap.
///
/// Text around the field (`^XA`, `^FO`, `^XZ` ...) is ignored. The data runs
/// to the next caret or tilde command, or the end of input.
pub fn parse(zpl: &str) -> Result<ParsedGraphicField, ZplError> {
    parse_with_limit(zpl, MAX_FIELD_BYTES)
}

/// [`parse`], refusing fields whose header declares more than `max_bytes`
/// decoded bytes. The check runs before any data is expanded.
pub fn parse_with_limit(zpl: &str, max_bytes: u64) -> Result<ParsedGraphicField, ZplError> {
    let malformed = |msg: &str| ZplError::MalformedField(msg.to_string());

    let start = zpl
        .find(GRAPHIC_FIELD)
        .ok_or_else(|| malformed("no ^GF command found"))?;
    let rest = &zpl[start + GRAPHIC_FIELD.len()..];

    let rest = match rest.chars().next() {
        Some('A') | Some('a') => &rest[1..],
        Some(other) => {
            return Err(ZplError::MalformedField(format!(
                "unsupported graphic field format '{}'",
                other
            )));
        }
        None => return Err(malformed("truncated ^GF command")),
    };
    let rest = rest
        .strip_prefix(',')
        .ok_or_else(|| malformed("expected ',' after ^GFA"))?;

    let mut params = rest.splitn(4, ',');
    let mut number = |name: &str| -> Result<u64, ZplError> {
        let raw = params
            .next()
            .ok_or_else(|| ZplError::MalformedField(format!("missing parameter {}", name)))?;
        raw.trim()
            .parse()
            .map_err(|_| ZplError::MalformedField(format!("parameter {} is not a number: '{}'", name, raw)))
    };
    let _field_bytes = number("b")?;
    let total_bytes = number("c")?;
    let bytes_per_row = number("d")?;
    if total_bytes > max_bytes {
        return Err(ZplError::MalformedField(format!(
            "field declares {} bytes, limit is {}",
            total_bytes, max_bytes
        )));
    }
    let data = params.next().unwrap_or("");
    let data = data.find(['^', '~']).map_or(data, |end| &data[..end]);

    let header = GraphicFieldHeader {
        total_bytes: u32::try_from(total_bytes).map_err(|_| malformed("byte count out of range"))?,
        bytes_per_row: u32::try_from(bytes_per_row).map_err(|_| malformed("row length out of range"))?,
    };

    let trimmed = data.trim();
    let (encoding, bytes) = if trimmed.starts_with(z64::Z64_PREFIX) || trimmed.starts_with(z64::B64_PREFIX) {
        let bytes = z64::decode(trimmed, header.total_bytes as usize)?;
        if bytes.len() != header.total_bytes as usize {
            return Err(ZplError::MalformedField(format!(
                "data holds {} bytes, header declares {}",
                bytes.len(),
                header.total_bytes
            )));
        }
        if header.bytes_per_row == 0 || header.total_bytes % header.bytes_per_row != 0 {
            return Err(malformed("total byte count is not a whole number of rows"));
        }
        (GraphicEncoding::Z64, bytes)
    } else {
        let is_plain = trimmed.chars().all(|c| c.is_ascii_hexdigit() || c.is_whitespace());
        let bytes = compress::decompress(
            trimmed,
            header.bytes_per_row as usize,
            header.total_bytes as usize,
        )?;
        let encoding = if is_plain && !trimmed.is_empty() {
            GraphicEncoding::Hex
        } else {
            GraphicEncoding::CompressedHex
        };
        (encoding, bytes)
    };

    Ok(ParsedGraphicField {
        header,
        encoding,
        bytes,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(bitmap: &MonochromeBitmap, encoding: GraphicEncoding) -> Vec<u8> {
        let field = encode(bitmap, encoding).unwrap();
        let parsed = parse(&field.to_string()).unwrap();
        assert_eq!(parsed.encoding == GraphicEncoding::Z64, encoding == GraphicEncoding::Z64);
        assert_eq!(parsed.header, field.header());
        parsed.bytes
    }

    #[test]
    fn test_header_text() {
        let bitmap = MonochromeBitmap::from_fn(16, 2, |x, _| x < 4);
        let field = encode(&bitmap, GraphicEncoding::Hex).unwrap();
        assert_eq!(field.to_string(), "^GFA,4,4,2,F000F000^FS");
    }

    #[test]
    fn test_compressed_text() {
        let bitmap = MonochromeBitmap::from_fn(16, 4, |_, y| y >= 2);
        let field = encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
        assert_eq!(field.data(), ",:!:");
    }

    #[test]
    fn test_empty_bitmap() {
        let field = encode(&MonochromeBitmap::new(0, 0), GraphicEncoding::CompressedHex).unwrap();
        assert_eq!(field.to_string(), "^GFA,0,0,0,^FS");

        let field = encode(&MonochromeBitmap::new(20, 0), GraphicEncoding::Z64).unwrap();
        assert_eq!(field.to_string(), "^GFA,0,0,3,^FS");

        let parsed = parse(&field.to_string()).unwrap();
        assert!(parsed.bytes.is_empty());
    }

    #[test]
    fn test_header_overflow() {
        let err = GraphicFieldHeader::for_dimensions(1 << 20, 1 << 20).unwrap_err();
        assert!(matches!(err, ZplError::EncodingOverflow { .. }));

        let err = GraphicFieldHeader::for_dimensions(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, ZplError::EncodingOverflow { .. }));

        // Exactly at the limit is fine
        let header = GraphicFieldHeader::for_dimensions(8, u32::MAX as usize).unwrap();
        assert_eq!(header.total_bytes, u32::MAX);
    }

    #[test]
    fn test_round_trip_all_white() {
        let bitmap = MonochromeBitmap::new(200, 50);
        for encoding in [GraphicEncoding::Hex, GraphicEncoding::CompressedHex, GraphicEncoding::Z64] {
            assert_eq!(round_trip(&bitmap, encoding), bitmap.as_bytes());
        }
        let field = encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
        assert_eq!(field.data(), format!(",{}", ":".repeat(49)));
    }

    #[test]
    fn test_round_trip_all_black() {
        let bitmap = MonochromeBitmap::from_fn(64, 30, |_, _| true);
        for encoding in [GraphicEncoding::Hex, GraphicEncoding::CompressedHex, GraphicEncoding::Z64] {
            assert_eq!(round_trip(&bitmap, encoding), bitmap.as_bytes());
        }
        let field = encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
        assert_eq!(field.data(), format!("!{}", ":".repeat(29)));
    }

    #[test]
    fn test_round_trip_duplicate_rows() {
        let bitmap = MonochromeBitmap::from_fn(48, 20, |x, _| x % 3 == 0);
        let field = encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
        assert_eq!(field.data().matches(':').count(), 19);
        assert_eq!(round_trip(&bitmap, GraphicEncoding::CompressedHex), bitmap.as_bytes());
    }

    #[test]
    fn test_round_trip_no_repeats() {
        // Consecutive bytes never share a nibble and rows never repeat
        let bytes: Vec<u8> = (0..16 * 16)
            .map(|i| {
                let hi = (i % 16) as u8;
                let lo = ((i / 16 + i % 16 + 1) % 16) as u8;
                if hi == lo { (hi << 4) | ((lo + 1) % 16) } else { (hi << 4) | lo }
            })
            .collect();
        let bitmap = MonochromeBitmap::from_packed(128, 16, bytes).unwrap();

        let field = encode(&bitmap, GraphicEncoding::CompressedHex).unwrap();
        assert!(!field.data().contains(':'));
        assert_eq!(round_trip(&bitmap, GraphicEncoding::CompressedHex), bitmap.as_bytes());
        assert_eq!(round_trip(&bitmap, GraphicEncoding::Hex), bitmap.as_bytes());
    }

    #[test]
    fn test_round_trip_odd_width() {
        let bitmap = MonochromeBitmap::from_fn(13, 9, |x, y| (x * y) % 4 == 1);
        assert_eq!(bitmap.bytes_per_row(), 2);
        for encoding in [GraphicEncoding::Hex, GraphicEncoding::CompressedHex, GraphicEncoding::Z64] {
            let bytes = round_trip(&bitmap, encoding);
            assert_eq!(bytes, bitmap.as_bytes());
            // Padding bits decode as white
            assert!(bytes.chunks(2).all(|row| row[1] & 0x07 == 0));
        }
    }

    #[test]
    fn test_parse_inside_label() {
        let zpl = "^XA\n^FO20,30^GFA,4,4,2,\nF0\n00\n^FS\n^XZ\n";
        let parsed = parse(zpl).unwrap();
        assert_eq!(parsed.header.bytes_per_row, 2);
        assert_eq!(parsed.header.rows(), 2);
        assert_eq!(parsed.bytes, vec![0xF0, 0x00, 0x00, 0x00]);
        assert_eq!(parsed.encoding, GraphicEncoding::Hex);

        let parsed = parse("^XA^FO0,0^GFA,4,4,2,F0,,^FS^XZ").unwrap();
        assert_eq!(parsed.bytes, vec![0xF0, 0x00, 0x00, 0x00]);
        assert_eq!(parsed.encoding, GraphicEncoding::CompressedHex);
    }

    #[test]
    fn test_parse_to_bitmap() {
        let parsed = parse("^GFA,2,2,1,80:^FS").unwrap();
        let bitmap = parsed.to_bitmap().unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (8, 2));
        assert!(bitmap.get(0, 0) && bitmap.get(0, 1));
        assert!(!bitmap.get(1, 0));
    }

    #[test]
    fn test_parse_errors() {
        for zpl in [
            "^XA^XZ",
            "^GFB,2,2,1,FFFF^FS",
            "^GFA,2,x,1,FFFF^FS",
            "^GFA,2,2",
            "^GFA,3,3,1,FF^FS",
        ] {
            assert!(
                matches!(parse(zpl), Err(ZplError::MalformedField(_))),
                "{:?} should not parse",
                zpl
            );
        }
    }

    #[test]
    fn test_parse_limit_checked_before_decoding() {
        let huge = "^GFA,4294967295,4294967295,4294967295,,^FS";
        let err = parse_with_limit(huge, 1024).unwrap_err();
        assert!(err.to_string().contains("limit is 1024"), "{}", err);

        let field = parse_with_limit("^GFA,4,4,2,!,^FS", 4).unwrap();
        assert_eq!(field.bytes, vec![0xFF, 0xFF, 0x00, 0x00]);
        assert!(parse_with_limit("^GFA,4,4,2,!,^FS", 3).is_err());
    }

    #[test]
    fn test_parse_stops_zlib_expansion_at_declared_size() {
        // 1 MB of zeroes deflates to about a kilobyte
        let bomb = z64::encode(&vec![0u8; 1 << 20]).unwrap();
        let zpl = format!("^GFA,16,16,2,{}^FS", bomb);

        let err = parse_with_limit(&zpl, 1024).unwrap_err();
        assert!(matches!(err, ZplError::MalformedField(_)));
        assert!(err.to_string().contains("more than 16 bytes"), "{}", err);
    }

    #[test]
    fn test_encoding_names() {
        use clap::ValueEnum;
        assert_eq!(
            GraphicEncoding::from_str("compressed", true).unwrap(),
            GraphicEncoding::CompressedHex
        );
        assert_eq!(GraphicEncoding::from_str("z64", true).unwrap(), GraphicEncoding::Z64);
        assert_eq!(
            serde_json::from_str::<GraphicEncoding>("\"compressed-hex\"").unwrap(),
            GraphicEncoding::CompressedHex
        );
    }
}
