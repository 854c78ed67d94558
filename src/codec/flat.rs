// Flat codec: raw memory images of pure-value types.
//
// The zero-overhead fast path. A container is written as its elements'
// contiguous byte images with no per-element framing; the element count is
// implied by source size / element width. The sole correctness guarantee is
// that the image, copied back, is bit-identical and safe to reinterpret —
// which is exactly what the `Pod` bound certifies.

use std::io;

use bytemuck::Pod;

use crate::codec::CodecError;
use crate::sink::{ByteSink, ByteSource};

/// Write a sequence of flat values as one contiguous block of raw images.
pub fn write_all<T: Pod, S: ByteSink>(sink: &mut S, elements: &[T]) -> Result<(), CodecError> {
    // Zero-width records carry no bytes.
    if size_of::<T>() == 0 || elements.is_empty() {
        return Ok(());
    }
    sink.write_bytes(bytemuck::cast_slice(elements))?;
    Ok(())
}

/// Write a single flat value's raw image.
pub fn write_one<T: Pod, S: ByteSink>(sink: &mut S, value: &T) -> Result<(), CodecError> {
    sink.write_bytes(bytemuck::bytes_of(value))?;
    Ok(())
}

/// Read flat values until the source is exhausted.
///
/// A final partial chunk is silently discarded; a source shorter than one
/// element yields an empty vector.
pub fn read_all<T: Pod, R: ByteSource>(source: &mut R) -> Result<Vec<T>, CodecError> {
    let mut out = Vec::new();
    read_all_into(source, &mut out)?;
    Ok(out)
}

/// Read flat values until the source is exhausted, appending to `out`.
/// Returns the number of elements appended. On error `out` still holds only
/// fully-read elements — never a partially-read one.
pub fn read_all_into<T: Pod, R: ByteSource>(
    source: &mut R,
    out: &mut Vec<T>,
) -> Result<usize, CodecError> {
    let width = size_of::<T>();
    if width == 0 {
        return Ok(0);
    }
    let mut image = vec![0u8; width];
    let mut appended = 0;
    loop {
        match source.read_bytes(&mut image) {
            Ok(()) => {
                out.push(bytemuck::pod_read_unaligned(&image));
                appended += 1;
            }
            // End of source; a trailing partial image is dropped.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
    Ok(appended)
}

/// Read a single flat value. Unlike the container read, truncation here is
/// an error.
pub fn read_one<T: Pod, R: ByteSource>(source: &mut R) -> Result<T, CodecError> {
    let width = size_of::<T>();
    let mut image = vec![0u8; width];
    source
        .read_bytes(&mut image)
        .map_err(|e| CodecError::from_read(e, width as u64))?;
    Ok(bytemuck::pod_read_unaligned(&image))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
