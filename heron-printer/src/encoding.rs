//! GBK encoding utilities for thermal printers
//!
//! Thermal printers in the field are overwhelmingly GBK devices; product
//! names may mix ASCII and CJK text. This module measures display widths
//! and converts UTF-8 buffers to GBK while leaving ESC/POS command bytes
//! untouched.

use tracing::instrument;

/// Get the GBK byte width of a string
///
/// CJK characters occupy 2 columns on the paper, ASCII occupies 1, which
/// matches their GBK byte lengths.
pub fn gbk_width(s: &str) -> usize {
    let (cow, _, _) = encoding_rs::GBK.encode(s);
    cow.len()
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to GBK
///
/// ASCII bytes (0x00-0x7F) pass through unchanged so ESC/POS commands are
/// never corrupted; only bytes >= 0x80 are treated as UTF-8 text and
/// re-encoded. Chinese mode is re-enabled after any INIT (ESC @) found in
/// the stream, and the Euro symbol gets a PC858 code-page escape since it
/// has no GBK representation most firmwares honor.
#[instrument(skip(bytes))]
pub fn convert_to_gbk(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len() * 2);

    // FS & - enable Chinese mode, FS C 1 - select GBK code page
    result.extend_from_slice(&[0x1C, 0x26, 0x1C, 0x43, 0x01]);

    let mut pending = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        // INIT (ESC @) resets the code page; re-enable Chinese mode after it
        if b == 0x1B && i + 1 < bytes.len() && bytes[i + 1] == 0x40 {
            flush_text(&mut pending, &mut result);
            result.extend_from_slice(&[0x1B, 0x40, 0x1C, 0x26]);
            i += 2;
            continue;
        }

        if b < 128 {
            flush_text(&mut pending, &mut result);
            result.push(b);
        } else {
            pending.push(b);
        }
        i += 1;
    }

    flush_text(&mut pending, &mut result);

    // FS . - exit Chinese mode
    result.extend_from_slice(&[0x1C, 0x2E]);

    result
}

/// Flush buffered non-ASCII bytes, converting UTF-8 text to GBK.
///
/// '€' is emitted as: exit Chinese mode, select PC858, 0xD5, re-enter
/// Chinese mode.
fn flush_text(pending: &mut Vec<u8>, result: &mut Vec<u8>) {
    if pending.is_empty() {
        return;
    }

    let s = String::from_utf8_lossy(pending);
    let parts: Vec<&str> = s.split('€').collect();

    for (idx, part) in parts.iter().enumerate() {
        if !part.is_empty() {
            let (gbk, _, _) = encoding_rs::GBK.encode(part);
            result.extend_from_slice(&gbk);
        }
        if idx < parts.len() - 1 {
            result.extend_from_slice(&[0x1C, 0x2E, 0x1B, 0x74, 19, 0xD5, 0x1C, 0x26]);
        }
    }
    pending.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbk_width() {
        assert_eq!(gbk_width("hello"), 5);
        assert_eq!(gbk_width("你好"), 4);
        assert_eq!(gbk_width("AB中文CD"), 8);
    }

    #[test]
    fn test_ascii_passthrough() {
        let input = b"\x1B\x61\x01TOTAL\n";
        let out = convert_to_gbk(input);
        // Commands and ASCII text survive unchanged between the mode markers
        assert!(
            out.windows(input.len())
                .any(|w| w == input.as_slice())
        );
    }

    #[test]
    fn test_init_reenables_chinese_mode() {
        let out = convert_to_gbk(&[0x1B, 0x40]);
        assert!(out.windows(4).any(|w| w == [0x1B, 0x40, 0x1C, 0x26]));
    }

    #[test]
    fn test_euro_escape() {
        let out = convert_to_gbk("1.50 €\n".as_bytes());
        assert!(
            out.windows(8)
                .any(|w| w == [0x1C, 0x2E, 0x1B, 0x74, 19, 0xD5, 0x1C, 0x26])
        );
    }
}
