//! ISO-8859-1 transcoding.
//!
//! X12 files are byte-oriented. Decoding each byte to the char with the same
//! code point keeps every byte of free-text elements intact through a split.

/// Decode raw file bytes, one byte per char
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text produced by [`decode`] back to the original bytes
///
/// Chars above U+00FF cannot come out of `decode`; they are written as `?`.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_bytes_survive() {
        let bytes = vec![b'N', b'M', b'1', b'*', 0xC9, 0xFF, b'~'];
        let text = decode(&bytes);
        assert_eq!(text.chars().count(), 7);
        assert_eq!(encode(&text), bytes);
    }

    #[test]
    fn test_unmappable_char() {
        assert_eq!(encode("a\u{4e16}b"), b"a?b");
    }
}
