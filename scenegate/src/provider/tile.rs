//! Streamed tile bodies.

use std::fmt;
use std::io::{self, Read};

/// Raw PNG bytes of one upstream tile, read straight off the connection.
///
/// The stream is single-pass and cannot be restarted. The upstream
/// connection stays checked out until the stream is dropped (or consumed
/// with [`TileStream::into_bytes`]), so hold it only as long as needed.
pub struct TileStream {
    body: Box<dyn Read + Send>,
}

impl TileStream {
    /// Wraps a body reader.
    pub fn new(body: impl Read + Send + 'static) -> Self {
        Self {
            body: Box::new(body),
        }
    }

    /// Drains the stream into memory and releases the connection.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Releases the connection without reading the rest of the body.
    pub fn close(self) {}
}

impl Read for TileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl fmt::Debug for TileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_into_bytes_returns_body() {
        let stream = TileStream::new(Cursor::new(b"test-data".to_vec()));
        assert_eq!(stream.into_bytes().unwrap(), b"test-data");
    }

    #[test]
    fn test_read_is_single_pass() {
        let mut stream = TileStream::new(Cursor::new(vec![1, 2, 3]));

        let mut first = Vec::new();
        stream.read_to_end(&mut first).unwrap();
        assert_eq!(first, vec![1, 2, 3]);

        let mut second = Vec::new();
        stream.read_to_end(&mut second).unwrap();
        assert!(second.is_empty());
    }
}
