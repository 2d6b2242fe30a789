//! Incremental byte-to-character decoding.

use std::io::{self, Read};

use bramble_dom::SourcePosition;
use encoding_rs::{Decoder, Encoding};

const CHUNK: usize = 8 * 1024;

/// Decodes a byte stream into characters on demand.
///
/// Undecodable byte sequences become U+FFFD; the position of the first one
/// is remembered. I/O errors end the stream and are kept for the caller.
pub struct DecodedChars<R: Read> {
    reader: R,
    decoder: Decoder,
    sniff_bom: bool,
    bom: Option<&'static Encoding>,
    bytes: Box<[u8]>,
    chars: String,
    next: usize,
    /// Whether the chunk in `chars` contained replacement output.
    chunk_had_errors: bool,
    position: SourcePosition,
    first_error: Option<SourcePosition>,
    io_error: Option<io::Error>,
    started: bool,
    done: bool,
}

impl<R: Read> DecodedChars<R> {
    /// Decode `reader` as `encoding`. With `sniff_bom`, a leading byte order
    /// mark overrides `encoding` and is not part of the output.
    pub fn new(reader: R, encoding: &'static Encoding, sniff_bom: bool) -> Self {
        let decoder = if sniff_bom {
            encoding.new_decoder()
        } else {
            encoding.new_decoder_without_bom_handling()
        };
        Self {
            reader,
            decoder,
            sniff_bom,
            bom: None,
            bytes: vec![0; CHUNK].into_boxed_slice(),
            chars: String::new(),
            next: 0,
            chunk_had_errors: false,
            position: SourcePosition::default(),
            first_error: None,
            io_error: None,
            started: false,
            done: false,
        }
    }

    /// The encoding in use, after any byte order mark was honored.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    /// The encoding named by a byte order mark, if the input started with
    /// one.
    #[must_use]
    pub const fn bom(&self) -> Option<&'static Encoding> {
        self.bom
    }

    /// Position of the first character produced from undecodable bytes.
    #[must_use]
    pub const fn first_error(&self) -> Option<SourcePosition> {
        self.first_error
    }

    /// Remove and return the I/O error that ended the stream, if any.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    /// Read as many bytes as the first chunk allows, so a byte order mark
    /// split across short reads is still seen whole.
    fn read_first(&mut self) -> usize {
        let mut filled = 0;
        while filled < 4 {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.io_error = Some(e);
                    break;
                }
            }
        }
        if self.sniff_bom {
            self.bom = Encoding::for_bom(&self.bytes[..filled]).map(|(encoding, _)| encoding);
        }
        filled
    }

    fn fill(&mut self) {
        self.chars.clear();
        self.next = 0;

        let read = if !self.started {
            self.started = true;
            self.read_first()
        } else {
            loop {
                match self.reader.read(&mut self.bytes) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        self.io_error = Some(e);
                        break 0;
                    }
                }
            }
        };
        let last = read == 0 || self.io_error.is_some();

        let needed = self
            .decoder
            .max_utf8_buffer_length(read)
            .unwrap_or(read * 3 + 16);
        self.chars.reserve(needed);
        let (_, _, had_errors) = self
            .decoder
            .decode_to_string(&self.bytes[..read], &mut self.chars, last);
        self.chunk_had_errors = had_errors;
        self.done = last;
    }
}

impl<R: Read> Iterator for DecodedChars<R> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.chars[self.next..].chars().next() {
                self.next += c.len_utf8();
                if c == '\u{FFFD}' && self.chunk_had_errors && self.first_error.is_none() {
                    self.first_error = Some(self.position);
                }
                self.position = self.position.advance(c);
                return Some(c);
            }
            if self.done {
                return None;
            }
            self.fill();
        }
    }
}

impl<R: Read> std::fmt::Debug for DecodedChars<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedChars")
            .field("encoding", &self.encoding().name())
            .field("bom", &self.bom.map(Encoding::name))
            .field("position", &self.position)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> (String, DecodedChars<&'a [u8]>) {
        let mut chars = DecodedChars::new(bytes, encoding, true);
        let text: String = chars.by_ref().collect();
        (text, chars)
    }

    #[test]
    fn test_decodes_windows_1252() {
        let (text, chars) = decode(b"caf\xe9", encoding_rs::WINDOWS_1252);
        assert_eq!(text, "caf\u{e9}");
        assert!(chars.first_error().is_none());
    }

    #[test]
    fn test_bom_overrides_encoding() {
        let (text, chars) = decode(b"\xef\xbb\xbfhi", encoding_rs::WINDOWS_1252);
        assert_eq!(text, "hi");
        assert_eq!(chars.bom(), Some(encoding_rs::UTF_8));
        assert_eq!(chars.encoding(), encoding_rs::UTF_8);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_and_located() {
        let (text, chars) = decode(b"ab\nc\xffd", encoding_rs::UTF_8);
        assert_eq!(text, "ab\nc\u{FFFD}d");
        let at = chars.first_error().unwrap();
        assert_eq!((at.line, at.column, at.offset), (2, 2, 4));
    }
}
