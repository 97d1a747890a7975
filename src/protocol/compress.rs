//! # ZPL ASCII Compression
//!
//! Run-length scheme used by `^GFA` fields carrying compressed hex data.
//!
//! ## Repeat Counts
//!
//! A run of one hex character is written as one or two count letters
//! followed by the character:
//!
//! | Letters | Count |
//! |---------|-------|
//! | `G H I ... Y` | 1, 2, 3 ... 19 |
//! | `g h i ... z` | 20, 40, 60 ... 400 |
//!
//! Letters add up, so `hL5` is 40 + 6 = 46 fives. The largest single code is
//! `zY` (419); longer runs are split into several codes.
//!
//! ## Row Markers
//!
//! | Char | Meaning |
//! |------|---------|
//! | `,` | fill the rest of the row with `0` |
//! | `!` | fill the rest of the row with `F` |
//! | `:` | repeat the previous row |
//!
//! ## Example
//!
//! ```text
//! Row bytes:  FF FF FF FF FF 00 00 00     hex: FFFFFFFFFF000000
//! Compressed: PF,                         (10 x F, then zeros to the end)
//!
//! Same row again: :
//! All white row:  ,
//! ```

use crate::error::ZplError;

/// Runs shorter than this are written literally.
pub const MIN_RUN: usize = 5;

/// Largest count a single `zY` code can express.
pub const MAX_REPEAT: usize = 419;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render bytes as uppercase hex pairs.
///
/// ```
/// use zplgfa::protocol::compress::to_hex;
///
/// assert_eq!(to_hex(&[0x00, 0xAB, 0xFF]), "00ABFF");
/// ```
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
    }
    out
}

/// Append the count letters and character for a run of `count` x `ch`.
fn push_run(out: &mut String, mut count: usize, ch: char) {
    while count > 0 {
        let chunk = count.min(MAX_REPEAT);
        let (high, low) = (chunk / 20, chunk % 20);
        if high > 0 {
            out.push((b'g' + (high - 1) as u8) as char);
        }
        if low > 0 {
            out.push((b'G' + (low - 1) as u8) as char);
        }
        out.push(ch);
        count -= chunk;
    }
}

/// Compress one packed row.
///
/// ```
/// use zplgfa::protocol::compress::compress_row;
///
/// assert_eq!(compress_row(&[0x00; 38]), ",");
/// assert_eq!(compress_row(&[0xFF; 38]), "!");
/// assert_eq!(compress_row(&[0x12, 0x34]), "1234");
/// assert_eq!(compress_row(&[0xAA, 0xAA, 0xAA, 0x00]), "LA,");
/// ```
pub fn compress_row(row: &[u8]) -> String {
    let hex = to_hex(row);
    let hex = hex.as_bytes();
    let mut out = String::new();

    let mut start = 0;
    while start < hex.len() {
        let ch = hex[start];
        let end = hex[start..]
            .iter()
            .position(|&c| c != ch)
            .map_or(hex.len(), |n| start + n);
        let run = end - start;

        if end == hex.len() && run > 1 && (ch == b'0' || ch == b'F') {
            out.push(if ch == b'0' { ',' } else { '!' });
        } else if run >= MIN_RUN {
            push_run(&mut out, run, ch as char);
        } else {
            for _ in 0..run {
                out.push(ch as char);
            }
        }

        start = end;
    }

    out
}

/// Compress every row of a packed bitmap, writing `:` for repeated rows.
///
/// `data` must hold a whole number of `bytes_per_row` rows.
pub fn compress(data: &[u8], bytes_per_row: usize) -> String {
    if bytes_per_row == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut previous: Option<&[u8]> = None;

    for row in data.chunks(bytes_per_row) {
        if previous == Some(row) {
            out.push(':');
        } else {
            out.push_str(&compress_row(row));
        }
        previous = Some(row);
    }

    out
}

/// Expand compressed (or plain) hex data back into packed bytes.
///
/// Line breaks are ignored. Fails unless the data describes exactly
/// `total_bytes` bytes in whole rows of `bytes_per_row`.
pub fn decompress(data: &str, bytes_per_row: usize, total_bytes: usize) -> Result<Vec<u8>, ZplError> {
    if bytes_per_row == 0 || total_bytes == 0 {
        if total_bytes == 0 && data.trim().is_empty() {
            return Ok(Vec::new());
        }
        return Err(ZplError::MalformedField(format!(
            "{} bytes of data cannot be laid out in rows of {} bytes",
            total_bytes, bytes_per_row
        )));
    }
    if total_bytes % bytes_per_row != 0 {
        return Err(ZplError::MalformedField(format!(
            "total byte count {} is not a multiple of row length {}",
            total_bytes, bytes_per_row
        )));
    }

    let row_chars = bytes_per_row * 2;
    // Sized by the data, not the header
    let mut out: Vec<u8> = Vec::new();
    let mut row: Vec<u8> = Vec::new();
    let mut previous: Option<Vec<u8>> = None;
    let mut count = 0usize;

    let malformed = |msg: String| ZplError::MalformedField(msg);

    for ch in data.chars() {
        match ch {
            '\r' | '\n' => continue,
            'G'..='Y' => count += (ch as usize) - ('G' as usize) + 1,
            'g'..='z' => count += ((ch as usize) - ('g' as usize) + 1) * 20,
            '0'..='9' | 'A'..='F' | 'a'..='f' => {
                let nibble = ch.to_ascii_uppercase() as u8;
                let repeat = count.max(1);
                count = 0;
                if row.len() + repeat > row_chars {
                    return Err(malformed(format!(
                        "run of {} '{}' overflows a {} byte row",
                        repeat, ch, bytes_per_row
                    )));
                }
                row.extend(std::iter::repeat_n(nibble, repeat));
            }
            ',' | '!' => {
                if count != 0 {
                    return Err(malformed(format!("repeat count before '{}'", ch)));
                }
                let fill = if ch == ',' { b'0' } else { b'F' };
                row.resize(row_chars, fill);
            }
            ':' => {
                if count != 0 || !row.is_empty() {
                    return Err(malformed("':' inside a row".to_string()));
                }
                let prev = previous
                    .as_ref()
                    .ok_or_else(|| malformed("':' before the first row".to_string()))?;
                row.extend_from_slice(prev);
            }
            other => return Err(malformed(format!("unexpected character '{}'", other))),
        }

        if row.len() == row_chars {
            if out.len() + bytes_per_row > total_bytes {
                return Err(malformed(format!("data exceeds declared {} bytes", total_bytes)));
            }
            out.extend(row.chunks_exact(2).map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1])));
            previous = Some(std::mem::take(&mut row));
        }
    }

    if count != 0 || !row.is_empty() {
        return Err(malformed("data ends inside a row".to_string()));
    }
    if out.len() != total_bytes {
        return Err(malformed(format!(
            "data holds {} bytes, header declares {}",
            out.len(),
            total_bytes
        )));
    }

    Ok(out)
}

#[inline]
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        _ => digit - b'A' + 10,
    }
}

// ============================================================================
// TESTS
// ============================================================================
