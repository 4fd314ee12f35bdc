//! UTF-8 decoding of query text from byte streams.

use std::{
    io::{self, BufReader, Bytes, Read},
    str,
};

use crate::error::ReadError;

/// Iterator over the code points of a UTF-8 byte stream.
///
/// Bytes are pulled on demand, so a lexer driving this iterator reads only as far as the
/// token it is producing. Malformed UTF-8 is reported as an [`io::ErrorKind::InvalidData`]
/// read error.
pub struct Utf8Chars<R> {
    /// Buffered byte source.
    bytes: Bytes<BufReader<R>>,
}

impl<R: Read> Utf8Chars<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
        }
    }

    /// Decodes one code point whose leading byte has already been read.
    fn decode(&mut self, first: u8) -> Result<char, ReadError> {
        let width = sequence_width(first).ok_or_else(invalid_utf8)?;
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.bytes.next().ok_or_else(invalid_utf8)??;
        }
        str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(invalid_utf8)
    }
}

impl<R: Read> Iterator for Utf8Chars<R> {
    type Item = Result<char, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.bytes.next()? {
            Ok(byte) => byte,
            Err(e) => return Some(Err(e.into())),
        };
        Some(self.decode(first))
    }
}

/// Returns the length of the UTF-8 sequence introduced by `first`.
fn sequence_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Builds the error reported for malformed input.
fn invalid_utf8() -> ReadError {
    io::Error::new(io::ErrorKind::InvalidData, "query text is not valid UTF-8").into()
}
