// Path-level persistence helpers.
//
// Thin wrappers that open or create the file, run the codec against the
// buffered adapter, and flush. Stream-kind callers use the codec functions
// over `StreamSink`/`StreamSource`; buffer-kind callers use them over
// `ByteCursor`; these cover the file-path kind.

use std::io;
use std::path::Path;

use bytemuck::Pod;

use crate::codec::{CodecError, FrameOptions, flat, framed, mixed};
use crate::cursor::ByteCursor;
use crate::sink::{FileSink, FileSource};

// ---------------------------------------------------------------------------
// Flat
// ---------------------------------------------------------------------------

/// Write a flat sequence to the file at `path`.
pub fn write_flat_file<T: Pod>(path: &Path, elements: &[T]) -> Result<(), CodecError> {
    let mut sink = FileSink::create(path)?;
    flat::write_all(&mut sink, elements)?;
    sink.flush()?;
    Ok(())
}

/// Read a flat sequence from the file at `path`.
pub fn read_flat_file<T: Pod>(path: &Path) -> Result<Vec<T>, CodecError> {
    let mut source = FileSource::open(path)?;
    flat::read_all(&mut source)
}

/// Write a single flat value to the file at `path`.
pub fn write_flat_object_file<T: Pod>(path: &Path, value: &T) -> Result<(), CodecError> {
    let mut sink = FileSink::create(path)?;
    flat::write_one(&mut sink, value)?;
    sink.flush()?;
    Ok(())
}

/// Read a single flat value from the file at `path`.
pub fn read_flat_object_file<T: Pod>(path: &Path) -> Result<T, CodecError> {
    let mut source = FileSource::open(path)?;
    flat::read_one(&mut source)
}

// ---------------------------------------------------------------------------
// Mixed layout
// ---------------------------------------------------------------------------

/// Write a mixed-layout sequence as `width`-byte records to the file at
/// `path`.
pub fn write_mixed_file<T, F>(
    path: &Path,
    elements: &[T],
    width: usize,
    emit: F,
) -> Result<(), CodecError>
where
    F: FnMut(&T, &mut ByteCursor<&mut [u8]>) -> bool,
{
    let mut sink = FileSink::create(path)?;
    mixed::write_all(&mut sink, elements, width, emit)?;
    sink.flush()?;
    Ok(())
}

/// Read a mixed-layout sequence of default-constructible elements from the
/// file at `path`.
pub fn read_mixed_file<T, M>(path: &Path, width: usize, merge: M) -> Result<Vec<T>, CodecError>
where
    T: Default,
    M: FnMut(&mut T, &mut ByteCursor<&[u8]>) -> bool,
{
    let mut source = FileSource::open(path)?;
    mixed::read_all(&mut source, width, merge)
}

/// Like [`read_mixed_file`], with a caller-supplied blank-instance factory.
pub fn read_mixed_file_with<T, FNew, M>(
    path: &Path,
    width: usize,
    make: FNew,
    merge: M,
) -> Result<Vec<T>, CodecError>
where
    FNew: FnMut() -> T,
    M: FnMut(&mut T, &mut ByteCursor<&[u8]>) -> bool,
{
    let mut source = FileSource::open(path)?;
    mixed::read_all_with(&mut source, width, make, merge)
}

// ---------------------------------------------------------------------------
// Framed
// ---------------------------------------------------------------------------

/// Frame a sequence into the file at `path`.
pub fn write_framed_file<T, FSize, FEmit>(
    path: &Path,
    elements: &[T],
    opts: &FrameOptions,
    size_of: FSize,
    emit: FEmit,
) -> Result<(), CodecError>
where
    FSize: Fn(&T) -> usize,
    FEmit: FnMut(&mut FileSink, &T, usize) -> io::Result<()>,
{
    let mut sink = FileSink::create(path)?;
    framed::write_all(&mut sink, elements, opts, size_of, emit)?;
    sink.flush()?;
    Ok(())
}

/// Read a framed sequence from the file at `path`.
pub fn read_framed_file<C, FIns>(
    path: &Path,
    opts: &FrameOptions,
    insert: FIns,
) -> Result<C, CodecError>
where
    C: Default,
    FIns: FnMut(&mut C, &mut ByteCursor<Vec<u8>>) -> bool,
{
    let mut source = FileSource::open(path)?;
    framed::read_all(&mut source, opts, insert)
}

/// Frame a single element into the file at `path`.
pub fn write_framed_object_file<T, FEmit>(
    path: &Path,
    value: &T,
    size: usize,
    opts: &FrameOptions,
    emit: FEmit,
) -> Result<(), CodecError>
where
    FEmit: FnMut(&mut FileSink, &T, usize) -> io::Result<()>,
{
    let mut sink = FileSink::create(path)?;
    framed::write_one(&mut sink, value, size, opts, emit)?;
    sink.flush()?;
    Ok(())
}

/// Read a single framed element from the file at `path`.
pub fn read_framed_object_file<T, FDec>(
    path: &Path,
    opts: &FrameOptions,
    decode: FDec,
) -> Result<T, CodecError>
where
    FDec: FnMut(&mut ByteCursor<Vec<u8>>) -> Option<T>,
{
    let mut source = FileSource::open(path)?;
    framed::read_one(&mut source, opts, decode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
