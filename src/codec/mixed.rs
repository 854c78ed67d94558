// Mixed-layout codec: fixed-width records for types that mix raw-copyable
// fields with fields owning separately-allocated storage.
//
// The wire shape matches the flat codec — every element occupies exactly
// `width` contiguous bytes, no per-element framing — but reconstruction is
// structured instead of a whole-object image copy. Each element starts
// from a freshly constructed blank instance whose owning fields hold valid,
// live state; the caller's merge callback copies the flat regions out of
// the record onto it and may assign derived fields afterward. Correctness
// of the record layout rests entirely on the emit/merge pair agreeing on
// field offsets and widths.

use std::io;
use std::slice;

use crate::codec::CodecError;
use crate::cursor::ByteCursor;
use crate::sink::{ByteSink, ByteSource};

/// Write each element as one `width`-byte record.
///
/// `emit` receives a zero-filled staging cursor per element and writes the
/// flat fields' byte images at its chosen offsets; regions it leaves
/// untouched stay zero. Overrunning the record width or returning `false`
/// aborts the write.
pub fn write_all<T, S, F>(
    sink: &mut S,
    elements: &[T],
    width: usize,
    mut emit: F,
) -> Result<(), CodecError>
where
    S: ByteSink,
    F: FnMut(&T, &mut ByteCursor<&mut [u8]>) -> bool,
{
    let mut staging = vec![0u8; width];
    for (index, element) in elements.iter().enumerate() {
        staging.fill(0);
        let mut cursor = ByteCursor::new(staging.as_mut_slice());
        let accepted = emit(element, &mut cursor);
        if !cursor.is_valid() {
            log::debug!("mixed write: element {index} overran the {width}-byte record");
            return Err(CodecError::ElementRejected { index });
        }
        if !accepted {
            return Err(CodecError::ElementRejected { index });
        }
        sink.write_bytes(&staging)?;
    }
    Ok(())
}

/// Write a single `width`-byte record.
pub fn write_one<T, S, F>(sink: &mut S, value: &T, width: usize, emit: F) -> Result<(), CodecError>
where
    S: ByteSink,
    F: FnMut(&T, &mut ByteCursor<&mut [u8]>) -> bool,
{
    write_all(sink, slice::from_ref(value), width, emit)
}

/// Read `width`-byte records until the source is exhausted, reconstructing
/// each element onto a default-constructed blank instance.
///
/// Container semantics match the flat codec: a trailing record truncated
/// below `width` ends the read and is discarded.
pub fn read_all<T, R, M>(source: &mut R, width: usize, merge: M) -> Result<Vec<T>, CodecError>
where
    T: Default,
    R: ByteSource,
    M: FnMut(&mut T, &mut ByteCursor<&[u8]>) -> bool,
{
    read_all_with(source, width, T::default, merge)
}

/// Like [`read_all`], but blank instances come from `make` — for types
/// without a meaningful `Default`, invoked once per element.
pub fn read_all_with<T, R, FNew, M>(
    source: &mut R,
    width: usize,
    mut make: FNew,
    mut merge: M,
) -> Result<Vec<T>, CodecError>
where
    R: ByteSource,
    FNew: FnMut() -> T,
    M: FnMut(&mut T, &mut ByteCursor<&[u8]>) -> bool,
{
    if width == 0 {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    let mut record = vec![0u8; width];
    loop {
        match source.read_bytes(&mut record) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(CodecError::Io(e)),
        }
        let mut instance = make();
        let mut cursor = ByteCursor::new(record.as_slice());
        if !merge(&mut instance, &mut cursor) {
            return Err(CodecError::ElementRejected { index: out.len() });
        }
        out.push(instance);
    }
    Ok(out)
}

/// Read a single `width`-byte record onto a default-constructed instance.
/// Truncation is an error here.
pub fn read_one<T, R, M>(source: &mut R, width: usize, merge: M) -> Result<T, CodecError>
where
    T: Default,
    R: ByteSource,
    M: FnMut(&mut T, &mut ByteCursor<&[u8]>) -> bool,
{
    read_one_with(source, width, T::default, merge)
}

/// Like [`read_one`], with a caller-supplied blank-instance factory.
pub fn read_one_with<T, R, FNew, M>(
    source: &mut R,
    width: usize,
    mut make: FNew,
    mut merge: M,
) -> Result<T, CodecError>
where
    R: ByteSource,
    FNew: FnMut() -> T,
    M: FnMut(&mut T, &mut ByteCursor<&[u8]>) -> bool,
{
    let mut record = vec![0u8; width];
    source
        .read_bytes(&mut record)
        .map_err(|e| CodecError::from_read(e, width as u64))?;
    let mut instance = make();
    let mut cursor = ByteCursor::new(record.as_slice());
    if !merge(&mut instance, &mut cursor) {
        return Err(CodecError::ElementRejected { index: 0 });
    }
    Ok(instance)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
