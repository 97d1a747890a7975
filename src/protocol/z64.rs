//! # Z64 Graphic Data
//!
//! Binary-safe alternative to hex for `^GFA` fields:
//!
//! ```text
//! :Z64:<base64(zlib(bytes))>:<crc>
//! ```
//!
//! `crc` is the CRC-16/XMODEM (polynomial 0x1021, initial value 0) of the
//! base64 text, written as four hex digits. The uncompressed `:B64:` form is
//! accepted when reading.

use std::io::{Read, Write};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};

use crate::error::ZplError;

pub const Z64_PREFIX: &str = ":Z64:";
pub const B64_PREFIX: &str = ":B64:";

/// CRC-16/XMODEM
///
/// ```
/// use zplgfa::protocol::z64::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0x31C3);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Encode packed bitmap bytes as Z64 field data.
pub fn encode(bytes: &[u8]) -> Result<String, ZplError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    let deflated = encoder.finish()?;

    let text = STANDARD.encode(deflated);
    let crc = crc16(text.as_bytes());
    Ok(format!("{}{}:{:04X}", Z64_PREFIX, text, crc))
}

/// Decode `:Z64:` or `:B64:` field data back into at most `max_len` bytes.
///
/// The checksum is verified when present. Inflation stops one byte past
/// `max_len`, so a small stream cannot expand without bound.
pub fn decode(data: &str, max_len: usize) -> Result<Vec<u8>, ZplError> {
    let data = data.trim();
    let (compressed, rest) = if let Some(rest) = data.strip_prefix(Z64_PREFIX) {
        (true, rest)
    } else if let Some(rest) = data.strip_prefix(B64_PREFIX) {
        (false, rest)
    } else {
        return Err(ZplError::MalformedField(
            "expected :Z64: or :B64: data".to_string(),
        ));
    };

    let (text, crc) = match rest.split_once(':') {
        Some((text, crc)) => (text, Some(crc)),
        None => (rest, None),
    };

    if let Some(crc) = crc {
        let expected = u16::from_str_radix(crc.trim(), 16)
            .map_err(|_| ZplError::MalformedField(format!("invalid CRC '{}'", crc)))?;
        let actual = crc16(text.as_bytes());
        if expected != actual {
            return Err(ZplError::MalformedField(format!(
                "CRC mismatch: field says {:04X}, data hashes to {:04X}",
                expected, actual
            )));
        }
    }

    let raw = STANDARD
        .decode(text)
        .map_err(|e| ZplError::MalformedField(format!("invalid base64: {}", e)))?;

    let too_long = || ZplError::MalformedField(format!("data holds more than {} bytes", max_len));

    if !compressed {
        if raw.len() > max_len {
            return Err(too_long());
        }
        return Ok(raw);
    }

    let mut out = Vec::new();
    ZlibDecoder::new(raw.as_slice())
        .take(max_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| ZplError::MalformedField(format!("invalid zlib stream: {}", e)))?;
    if out.len() > max_len {
        return Err(too_long());
    }
    Ok(out)
}
