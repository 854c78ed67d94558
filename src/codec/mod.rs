// Codec layer: three complementary strategies over one sink/source contract.
//
// - `flat`   — raw memory images of pure-value (`Pod`) types
// - `mixed`  — fixed-width records for types mixing flat and owning fields
// - `framed` — size-prefixed, optionally version-tagged variable-length
//              records driven by caller callbacks
// - `word`   — the fixed-width wire integers the framing protocol is built on

pub mod flat;
pub mod framed;
pub mod mixed;
pub mod word;

pub use framed::{FrameOptions, SizeCheck};

use std::io;

use thiserror::Error;

/// Error type shared by all codecs.
///
/// An error means zero partial results: container reads hold only
/// fully-decoded elements, single-object reads yield nothing.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying I/O failure (open, read, write, flush).
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// Fewer bytes available than a declared or fixed size requires.
    #[error("input truncated: {expected}-byte record incomplete")]
    Truncated { expected: u64 },

    /// Stored schema version differs from the expected one.
    #[error("schema version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u64, found: u64 },

    /// A paired callback wrote or consumed a byte count differing from the
    /// declared element size. Signals a callback bug, not corrupt data.
    #[error("size contract violated: declared {declared} bytes, observed {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    /// A caller-supplied encode/decode callback reported failure.
    #[error("element {index} rejected by codec callback")]
    ElementRejected { index: usize },

    /// A declared size or count does not fit in addressable memory.
    #[error("declared size {0} exceeds addressable memory")]
    Oversize(u64),
}

impl CodecError {
    /// Classify a failed exact read: a short read is truncation, anything
    /// else is an I/O failure.
    pub(crate) fn from_read(err: io::Error, expected: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated { expected }
        } else {
            Self::Io(err)
        }
    }
}
