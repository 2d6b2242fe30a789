//! Byte sources for the loader.
//!
//! A restart re-reads the document from where loading began, so the loader
//! asks the source whether it can do that instead of guessing from its type.

use std::io::{self, Read, Seek, SeekFrom};

/// A byte stream the loader reads a document from.
pub trait HtmlSource: Read {
    /// Whether [`restart`](Self::restart) can rewind the stream.
    fn supports_restart(&self) -> bool;

    /// Rewind to where loading began.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be rewound.
    fn restart(&mut self) -> io::Result<()>;
}

/// A rewindable source over any seekable reader.
#[derive(Debug)]
pub struct SeekableSource<R: Read + Seek> {
    inner: R,
    start: u64,
}

impl<R: Read + Seek> SeekableSource<R> {
    /// Wrap `inner`; restarts return to its current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the current position cannot be queried.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let start = inner.stream_position()?;
        Ok(Self { inner, start })
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for SeekableSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> HtmlSource for SeekableSource<R> {
    fn supports_restart(&self) -> bool {
        true
    }

    fn restart(&mut self) -> io::Result<()> {
        let _ = self.inner.seek(SeekFrom::Start(self.start))?;
        Ok(())
    }
}

/// A read-once source such as a pipe or socket.
#[derive(Debug)]
pub struct ForwardSource<R: Read>(R);

impl<R: Read> ForwardSource<R> {
    /// Wrap `inner`.
    pub const fn new(inner: R) -> Self {
        Self(inner)
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Read> Read for ForwardSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> HtmlSource for ForwardSource<R> {
    fn supports_restart(&self) -> bool {
        false
    }

    fn restart(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "forward-only source cannot be rewound",
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_seekable_restart_returns_to_start() {
        let mut cursor = Cursor::new(b"xxhello".to_vec());
        cursor.set_position(2);
        let mut source = SeekableSource::new(cursor).unwrap();
        let mut first = String::new();
        let _ = source.read_to_string(&mut first).unwrap();
        source.restart().unwrap();
        let mut second = String::new();
        let _ = source.read_to_string(&mut second).unwrap();
        assert_eq!(first, "hello");
        assert_eq!(second, "hello");
    }

    #[test]
    fn test_forward_source_refuses_restart() {
        let mut source = ForwardSource::new(&b"abc"[..]);
        assert!(!source.supports_restart());
        assert!(source.restart().is_err());
    }
}
