// Bounds-checked byte cursor: a position-tracking view over a byte buffer.
//
// Every codec stages or consumes element bytes through this type. The
// position is an `Option<usize>`: `None` means the cursor was invalidated
// by an operation that would have overrun the remaining bytes. A failed
// operation never partially mutates the buffer or the position, and the
// invalid state is sticky until `reset` or `seek`.

use std::io;

use bytemuck::Pod;

use crate::sink::{ByteSink, ByteSource};

/// Bounds-checked, position-tracking view over byte storage.
///
/// Generic over the storage so both owned buffers (`Vec<u8>`) and borrowed
/// slices (`&[u8]`, `&mut [u8]`) share one implementation. Read operations
/// need `B: AsRef<[u8]>`; write operations additionally need
/// `B: AsMut<[u8]>`. The underlying buffer is never reallocated.
#[derive(Debug, Clone)]
pub struct ByteCursor<B = Vec<u8>> {
    bytes: B,
    pos: Option<usize>,
}

impl ByteCursor<Vec<u8>> {
    /// Create a write-staging cursor over a freshly allocated, zero-filled
    /// buffer of `len` bytes.
    pub fn with_len(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
            pos: Some(0),
        }
    }

    /// Consume the cursor, returning the owned buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl<B: AsRef<[u8]>> ByteCursor<B> {
    /// Wrap existing byte storage, positioned at the start.
    pub fn new(bytes: B) -> Self {
        Self {
            bytes,
            pos: Some(0),
        }
    }

    /// Total buffer length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.as_ref().len()
    }

    /// Whether the buffer holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.as_ref().is_empty()
    }

    /// Current position, or `None` once the cursor has been invalidated.
    pub fn position(&self) -> Option<usize> {
        self.pos
    }

    /// Whether the cursor is still valid (no overrun has occurred).
    pub fn is_valid(&self) -> bool {
        self.pos.is_some()
    }

    /// Bytes left between the position and the end of the buffer.
    /// An invalidated cursor reports zero.
    pub fn remaining(&self) -> usize {
        match self.pos {
            Some(pos) => self.len() - pos,
            None => 0,
        }
    }

    /// Re-position at the start and clear the invalid state, so the same
    /// buffer can be re-read (e.g. retried with another expected version).
    pub fn reset(&mut self) {
        self.pos = Some(0);
    }

    /// Re-position at `pos`, clearing the invalid state. Fails (leaving the
    /// cursor untouched) if `pos` lies beyond the buffer.
    pub fn seek(&mut self, pos: usize) -> bool {
        if pos > self.len() {
            return false;
        }
        self.pos = Some(pos);
        true
    }

    /// Skip `count` bytes without copying, e.g. after a nested decode has
    /// already consumed them out-of-band.
    pub fn advance(&mut self, count: usize) -> bool {
        self.claim(count).is_some()
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_slice(&mut self, count: usize) -> Option<&[u8]> {
        let start = self.claim(count)?;
        Some(&self.bytes.as_ref()[start..start + count])
    }

    /// Read one value of a flat type from its raw byte image.
    ///
    /// The `Pod` bound is what makes the reinterpretation sound; unaligned
    /// buffer offsets are fine.
    pub fn read_pod<T: Pod>(&mut self) -> Option<T> {
        let image = self.read_slice(size_of::<T>())?;
        Some(bytemuck::pod_read_unaligned(image))
    }

    /// View of the unread tail. Empty once invalidated.
    pub fn remaining_slice(&self) -> &[u8] {
        match self.pos {
            Some(pos) => &self.bytes.as_ref()[pos..],
            None => &[],
        }
    }

    /// The whole underlying buffer, independent of position.
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Consume the cursor, returning the storage.
    pub fn into_inner(self) -> B {
        self.bytes
    }

    /// Check that `count` bytes remain, then advance past them, returning
    /// the old position. Overrun invalidates the cursor and mutates nothing
    /// else; an already-invalid cursor stays invalid.
    fn claim(&mut self, count: usize) -> Option<usize> {
        let pos = self.pos?;
        if count > self.bytes.as_ref().len() - pos {
            self.pos = None;
            return None;
        }
        self.pos = Some(pos + count);
        Some(pos)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<B> {
    /// Copy `bytes` in at the current position and advance past them.
    pub fn write_slice(&mut self, bytes: &[u8]) -> bool {
        match self.claim(bytes.len()) {
            Some(start) => {
                self.bytes.as_mut()[start..start + bytes.len()].copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    /// Write one flat value as its raw byte image.
    pub fn write_pod<T: Pod>(&mut self, value: &T) -> bool {
        self.write_slice(bytemuck::bytes_of(value))
    }
}

// ---------------------------------------------------------------------------
// Adapter impls: a cursor is the in-memory buffer sink/source
// ---------------------------------------------------------------------------

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteSink for ByteCursor<B> {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.write_slice(bytes) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "buffer capacity exhausted",
            ))
        }
    }

    // An invalidated cursor reports the full length: the failed write that
    // invalidated it has already surfaced as an error.
    fn position(&self) -> u64 {
        self.pos.unwrap_or_else(|| self.len()) as u64
    }
}

impl<B: AsRef<[u8]>> ByteSource for ByteCursor<B> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        match self.read_slice(buf.len()) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "buffer exhausted",
            )),
        }
    }

    fn position(&self) -> u64 {
        self.pos.unwrap_or_else(|| self.len()) as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
