// Framing codec: size-prefixed records with an optional schema-version tag.
//
// The variable-length, self-describing encoding for elements the flat and
// mixed codecs cannot express (nested containers, strings, maps). Wire
// shape, in 8-byte host-endian words:
//
//   container:      [version?][count]{[size_i][payload_i]}*count
//   single object:  [version?][size][payload]
//
// Element encoding and decoding are caller-supplied callbacks; the codec
// owns the framing words and verifies the size contract post-hoc. The
// version tag is the schema-evolution mechanism: reads compare it exactly
// and abort on mismatch, so callers can chain explicit
// read-old / translate / write-new migration steps.

use std::io;

use crate::codec::word::{self, word_to_len};
use crate::codec::CodecError;
use crate::cursor::ByteCursor;
use crate::sink::{ByteSink, ByteSource};

/// Payload fill step for declared element sizes.
const PAYLOAD_CHUNK: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Policy for a size-contract violation: a callback that wrote or consumed
/// a byte count differing from the declared element size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    /// Report via `log::warn!` and keep going.
    Warn,
    /// Abort with [`CodecError::SizeMismatch`].
    Fail,
}

/// Framing configuration shared by the write and read paths.
#[derive(Debug, Clone)]
pub struct FrameOptions {
    /// Schema version tag written at (or expected at) the head of the
    /// frame. `None` omits the tag entirely.
    pub version: Option<u64>,
    /// Policy when a write callback's emitted byte count differs from the
    /// declared size.
    pub write_size_check: SizeCheck,
    /// Policy when a decode callback's consumed byte count differs from
    /// the declared size.
    pub read_size_check: SizeCheck,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            version: None,
            // A write mismatch always signals a broken size-getter pair.
            write_size_check: SizeCheck::Fail,
            read_size_check: SizeCheck::Warn,
        }
    }
}

impl FrameOptions {
    /// Frame with a schema version tag.
    pub fn versioned(version: u64) -> Self {
        Self {
            version: Some(version),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

/// Frame a sequence of elements.
///
/// `size_of` declares each element's encoded byte count; `emit` must then
/// write exactly that many bytes to the sink. The codec verifies the
/// contract through the sink's position delta.
pub fn write_all<T, S, FSize, FEmit>(
    sink: &mut S,
    elements: &[T],
    opts: &FrameOptions,
    size_of: FSize,
    mut emit: FEmit,
) -> Result<(), CodecError>
where
    S: ByteSink,
    FSize: Fn(&T) -> usize,
    FEmit: FnMut(&mut S, &T, usize) -> io::Result<()>,
{
    if let Some(version) = opts.version {
        word::write_word(sink, version)?;
    }
    word::write_word(sink, elements.len() as u64)?;
    for (index, element) in elements.iter().enumerate() {
        let size = size_of(element);
        write_record(sink, element, size, index, opts.write_size_check, &mut emit)?;
    }
    Ok(())
}

/// Frame a single element: `[version?][size][payload]`, no count word.
pub fn write_one<T, S, FEmit>(
    sink: &mut S,
    value: &T,
    size: usize,
    opts: &FrameOptions,
    mut emit: FEmit,
) -> Result<(), CodecError>
where
    S: ByteSink,
    FEmit: FnMut(&mut S, &T, usize) -> io::Result<()>,
{
    if let Some(version) = opts.version {
        word::write_word(sink, version)?;
    }
    write_record(sink, value, size, 0, opts.write_size_check, &mut emit)
}

/// Frame a sequence into a freshly allocated in-memory buffer, returned
/// reset to the start so it can be handed straight to a read.
pub fn encode_to_buffer<T, FSize, FEmit>(
    elements: &[T],
    opts: &FrameOptions,
    size_of: FSize,
    emit: FEmit,
) -> Result<ByteCursor<Vec<u8>>, CodecError>
where
    FSize: Fn(&T) -> usize,
    FEmit: FnMut(&mut ByteCursor<Vec<u8>>, &T, usize) -> io::Result<()>,
{
    let head = word::WORD_WIDTH * (1 + usize::from(opts.version.is_some()));
    let total = head
        + elements
            .iter()
            .map(|e| word::WORD_WIDTH + size_of(e))
            .sum::<usize>();
    let mut buffer = ByteCursor::with_len(total);
    write_all(&mut buffer, elements, opts, &size_of, emit)?;
    buffer.reset();
    Ok(buffer)
}

fn write_record<T, S, FEmit>(
    sink: &mut S,
    element: &T,
    size: usize,
    index: usize,
    check: SizeCheck,
    emit: &mut FEmit,
) -> Result<(), CodecError>
where
    S: ByteSink,
    FEmit: FnMut(&mut S, &T, usize) -> io::Result<()>,
{
    word::write_word(sink, size as u64)?;
    let before = sink.position();
    emit(sink, element, size)?;
    let written = sink.position() - before;
    if written != size as u64 {
        match check {
            SizeCheck::Fail => {
                return Err(CodecError::SizeMismatch {
                    declared: size as u64,
                    actual: written,
                });
            }
            SizeCheck::Warn => {
                log::warn!(
                    "frame element {index}: declared {size} bytes, callback wrote {written}"
                );
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

/// Read a framed sequence into a fresh container.
///
/// Per element, the declared payload is sliced into a bounded cursor and
/// handed to `insert`, which decodes it and stores the element in the
/// container. Any failure — version mismatch, truncation, a rejecting
/// callback — aborts the whole read; the partially filled container is
/// dropped and never surfaced.
pub fn read_all<C, R, FIns>(
    source: &mut R,
    opts: &FrameOptions,
    mut insert: FIns,
) -> Result<C, CodecError>
where
    C: Default,
    R: ByteSource,
    FIns: FnMut(&mut C, &mut ByteCursor<Vec<u8>>) -> bool,
{
    expect_version(source, opts)?;
    let count = word::read_word(source)
        .map_err(|e| CodecError::from_read(e, word::WORD_WIDTH as u64))?;
    let mut container = C::default();
    for index in 0..count {
        read_record(source, opts.read_size_check, index as usize, |cursor| {
            insert(&mut container, cursor)
        })?;
    }
    Ok(container)
}

/// Read a single framed element.
pub fn read_one<T, R, FDec>(
    source: &mut R,
    opts: &FrameOptions,
    mut decode: FDec,
) -> Result<T, CodecError>
where
    R: ByteSource,
    FDec: FnMut(&mut ByteCursor<Vec<u8>>) -> Option<T>,
{
    expect_version(source, opts)?;
    let mut slot = None;
    read_record(source, opts.read_size_check, 0, |cursor| {
        slot = decode(cursor);
        slot.is_some()
    })?;
    slot.ok_or(CodecError::ElementRejected { index: 0 })
}

fn expect_version<R: ByteSource>(source: &mut R, opts: &FrameOptions) -> Result<(), CodecError> {
    if let Some(expected) = opts.version {
        let found = word::read_word(source)
            .map_err(|e| CodecError::from_read(e, word::WORD_WIDTH as u64))?;
        if found != expected {
            log::debug!("frame version mismatch: stored {found}, expected {expected}");
            return Err(CodecError::VersionMismatch { expected, found });
        }
    }
    Ok(())
}

fn read_record<R, F>(
    source: &mut R,
    check: SizeCheck,
    index: usize,
    mut decode: F,
) -> Result<(), CodecError>
where
    R: ByteSource,
    F: FnMut(&mut ByteCursor<Vec<u8>>) -> bool,
{
    let declared = word::read_word(source)
        .map_err(|e| CodecError::from_read(e, word::WORD_WIDTH as u64))?;
    let size = word_to_len(declared)?;

    // Fill in bounded steps so a corrupt size word cannot trigger a huge
    // allocation before truncation is detected.
    let mut payload = Vec::with_capacity(size.min(PAYLOAD_CHUNK));
    while payload.len() < size {
        let step = (size - payload.len()).min(PAYLOAD_CHUNK);
        let start = payload.len();
        payload.resize(start + step, 0);
        source
            .read_bytes(&mut payload[start..])
            .map_err(|e| CodecError::from_read(e, declared))?;
    }

    let mut cursor = ByteCursor::new(payload);
    if !decode(&mut cursor) {
        return Err(CodecError::ElementRejected { index });
    }

    match cursor.position() {
        Some(consumed) if consumed == size => {}
        Some(consumed) => match check {
            SizeCheck::Fail => {
                return Err(CodecError::SizeMismatch {
                    declared,
                    actual: consumed as u64,
                });
            }
            SizeCheck::Warn => {
                log::warn!(
                    "frame element {index}: declared {declared} bytes, callback consumed {consumed}"
                );
            }
        },
        // The callback overran the record and invalidated the cursor.
        None => match check {
            SizeCheck::Fail => return Err(CodecError::Truncated { expected: declared }),
            SizeCheck::Warn => {
                log::warn!("frame element {index}: callback overran the {declared}-byte record");
            }
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
