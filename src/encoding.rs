//! Decoding raw bytes into the text the core consumes.
//!
//! The profiling engine itself only ever sees decoded text; this module is
//! the thin boundary that gets it there. Detection uses chardetng with a
//! SIMD-accelerated UTF-8 fast path.

use chardetng::EncodingDetector;
use simdutf8::basic::from_utf8;

use crate::error::Result;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the data starts with a UTF-8 BOM (Byte Order Mark).
///
/// The UTF-8 BOM is the byte sequence: EF BB BF
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.len() >= 3 && data[0] == 0xEF && data[1] == 0xBB && data[2] == 0xBF
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) { &data[3..] } else { data }
}

/// Decode raw bytes to a UTF-8 string.
///
/// UTF-16 BOMs are honored first (chardetng does not handle them well), then
/// valid UTF-8 passes through, and anything else goes through chardetng
/// detection with an `encoding_rs` transcode.
pub fn decode_to_string(data: &[u8]) -> Result<String> {
    if data.len() >= 2 {
        if data[0] == 0xFF && data[1] == 0xFE {
            let (decoded, _, _) = encoding_rs::UTF_16LE.decode(data);
            return Ok(decoded.into_owned());
        }
        if data[0] == 0xFE && data[1] == 0xFF {
            let (decoded, _, _) = encoding_rs::UTF_16BE.decode(data);
            return Ok(decoded.into_owned());
        }
    }

    let data = skip_bom(data);
    if let Ok(text) = from_utf8(data) {
        return Ok(text.to_owned());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(data);
    Ok(decoded.into_owned())
}
