//! Fixed-window ASCII helpers used by the device list parser.
//!
//! These operate on raw bytes, not `str`: the kernel pseudo-files are ASCII but
//! nothing guarantees UTF-8 for device names, and the parser must never fail on
//! a stray byte.

/// Outcome of [`read_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRead {
    /// A full line was copied; the value is its length including the terminator.
    Complete(usize),
    /// A NUL byte (or the end of the buffer) came before any terminator.
    EndOfInput,
    /// `max_len` bytes were scanned without finding a terminator or NUL.
    Unterminated,
}

/// Compare the first `n` bytes of `buffer` and `prefix`.
///
/// Returns `None` if `prefix` has fewer than `n` bytes, `Some(false)` if
/// `buffer` is too short to match.
pub fn starts_with(buffer: &[u8], prefix: &[u8], n: usize) -> Option<bool> {
    if prefix.len() < n {
        return None;
    }
    if buffer.len() < n {
        return Some(false);
    }
    Some(buffer[..n] == prefix[..n])
}

/// Brute-force search for `needle` inside `buffer`.
///
/// An empty needle is never found.
pub fn contains(buffer: &[u8], needle: &[u8]) -> bool {
    contains_with_index(buffer, needle).is_some()
}

/// Start offset of the first occurrence of `needle` in `buffer`.
pub fn contains_with_index(buffer: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > buffer.len() {
        return None;
    }
    buffer.windows(needle.len()).position(|w| w == needle)
}

#[inline]
pub fn is_ascii_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}

/// Copy the bytes of `buffer` up to and including the first `terminator` into `out`.
///
/// At most `max_len` bytes are scanned. The end of `buffer` is treated like a
/// NUL byte, so a trailing line without terminator reads as end of input.
/// `out` is cleared first and reserved to `max_len`.
pub fn read_line(buffer: &[u8], terminator: u8, max_len: usize, out: &mut Vec<u8>) -> LineRead {
    out.clear();
    out.reserve(max_len);

    for (idx, &byte) in buffer.iter().take(max_len).enumerate() {
        if byte == terminator {
            out.extend_from_slice(&buffer[..=idx]);
            return LineRead::Complete(idx + 1);
        }
        if byte == 0 {
            return LineRead::EndOfInput;
        }
    }

    if buffer.len() < max_len {
        LineRead::EndOfInput
    } else {
        LineRead::Unterminated
    }
}
