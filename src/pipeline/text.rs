//! Plain-text extraction: decode the upload as UTF-8.
//!
//! No capability is involved and the content is passed through as-is, so a
//! paper uploaded as a `.txt` reaches the generator exactly as it would via
//! ProcessText. Only the UTF-8 BOM is dropped. Invalid byte sequences are
//! replaced with U+FFFD rather than rejected, so a text file saved in a
//! legacy encoding still reaches the generator with most of its content
//! intact.

use crate::artifact::ExtractedText;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode a plain-text payload.
pub fn extract(bytes: &[u8]) -> ExtractedText {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let decoded = String::from_utf8_lossy(body);
    if let std::borrow::Cow::Owned(_) = decoded {
        debug!("Text upload contained invalid UTF-8; replaced with U+FFFD");
    }
    ExtractedText::new(decoded.into_owned())
}
