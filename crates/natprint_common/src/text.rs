//! Line-ending normalization for text content.

use std::borrow::Cow;

/// Number of leading bytes inspected when classifying content as binary.
const BINARY_SNIFF_LEN: usize = 8000;

/// Returns `true` if `bytes` looks like text: no NUL in the first 8000 bytes.
pub fn is_probably_text(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    !window.contains(&0)
}

/// Rewrites CRLF sequences to LF when `bytes` looks like text.
///
/// Binary content and text without any CRLF are returned borrowed and unchanged.
/// Lone `\r` bytes are preserved.
pub fn normalize_line_endings(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !is_probably_text(bytes) || !bytes.windows(2).any(|w| w == b"\r\n") {
        return Cow::Borrowed(bytes);
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    Cow::Owned(out)
}
