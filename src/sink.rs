// Sink/source adapters: the minimal byte-transport contract every codec is
// written against, plus the stream and file implementations.
//
// The in-memory implementation is `ByteCursor` (see `cursor`). Codecs take
// `&mut impl ByteSink` / `&mut impl ByteSource`, so dispatch is static and
// one codec body serves files, streams, and buffers alike.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Buffered-file I/O chunk size.
const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Destination for encoded bytes.
///
/// `position` reports total bytes accepted so far; the framing codec uses
/// position deltas to verify write-callback size contracts.
pub trait ByteSink {
    /// Write all of `bytes`, or fail.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Bytes written through this sink so far.
    fn position(&self) -> u64;
}

/// Origin of encoded bytes.
pub trait ByteSource {
    /// Fill `buf` exactly. Running out of input surfaces as
    /// `ErrorKind::UnexpectedEof`, which the container codecs treat as
    /// end-of-source at element boundaries and as truncation elsewhere.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Bytes consumed from this source so far.
    fn position(&self) -> u64;
}

// ---------------------------------------------------------------------------
// Stream adapters
// ---------------------------------------------------------------------------

/// Adapter over any `Write`, with an internal byte counter serving the
/// position query (streams need not be seekable).
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Flush buffered bytes through to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Unwrap, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for StreamSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.written
    }
}

/// Adapter over any `Read`, with an internal byte counter.
#[derive(Debug)]
pub struct StreamSource<R: Read> {
    inner: R,
    consumed: u64,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    /// Unwrap, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    // Bytes short of a full fill stay consumed; the caller
                    // decides whether a partial record is an error.
                    self.consumed += filled as u64;
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "source exhausted mid-record",
                    ));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.consumed += filled as u64;
                    return Err(e);
                }
            }
        }
        self.consumed += filled as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.consumed
    }
}

// ---------------------------------------------------------------------------
// File adapters
// ---------------------------------------------------------------------------

/// Buffered file sink.
pub type FileSink = StreamSink<BufWriter<File>>;

impl FileSink {
    /// Create (truncating) the file at `path` behind a 64 KiB write buffer.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(StreamSink::new(BufWriter::with_capacity(BUF_SIZE, file)))
    }
}

/// Buffered file source.
pub type FileSource = StreamSource<BufReader<File>>;

impl FileSource {
    /// Open the file at `path` behind a 64 KiB read buffer.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(StreamSource::new(BufReader::with_capacity(BUF_SIZE, file)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stream_sink_counts_written_bytes() {
        let mut sink = StreamSink::new(Vec::new());
        sink.write_bytes(b"abc").unwrap();
        sink.write_bytes(b"defgh").unwrap();
        assert_eq!(sink.position(), 8);
        assert_eq!(sink.into_inner(), b"abcdefgh");
    }

    #[test]
    fn stream_source_exact_fill() {
        let mut source = StreamSource::new(Cursor::new(b"0123456789".to_vec()));
        let mut buf = [0u8; 4];
        source.read_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"0123");
        assert_eq!(source.position(), 4);
        source.read_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"4567");
    }

    #[test]
    fn stream_source_short_read_is_eof() {
        let mut source = StreamSource::new(Cursor::new(b"abc".to_vec()));
        let mut buf = [0u8; 8];
        let err = source.read_bytes(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        // The partial fill was still consumed from the stream.
        assert_eq!(source.position(), 3);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.bin");

        let mut sink = FileSink::create(&path).unwrap();
        sink.write_bytes(b"persisted").unwrap();
        assert_eq!(sink.position(), 9);
        sink.flush().unwrap();
        drop(sink);

        let mut source = FileSource::open(&path).unwrap();
        let mut buf = [0u8; 9];
        source.read_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"persisted");
        assert!(source.read_bytes(&mut [0u8; 1]).is_err());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileSource::open(&dir.path().join("absent.bin")).is_err());
    }
}
