// Fixed-width wire words.
//
// Version tags, element counts, and size prefixes are 8-byte host-endian
// integers — the memory image of a `u64`, with no varint packing. Like the
// record payloads themselves, frames are not portable across architectures
// with a different byte order.

use std::io;

use crate::sink::{ByteSink, ByteSource};

/// Encoded width of one wire word.
pub const WORD_WIDTH: usize = size_of::<u64>();

/// Write one word to a sink.
pub fn write_word<S: ByteSink>(sink: &mut S, value: u64) -> io::Result<()> {
    sink.write_bytes(&value.to_ne_bytes())
}

/// Read one word from a source.
pub fn read_word<R: ByteSource>(source: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; WORD_WIDTH];
    source.read_bytes(&mut buf)?;
    Ok(u64::from_ne_bytes(buf))
}

/// Narrow a declared word to an in-memory size.
pub(crate) fn word_to_len(value: u64) -> Result<usize, crate::codec::CodecError> {
    usize::try_from(value).map_err(|_| crate::codec::CodecError::Oversize(value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
