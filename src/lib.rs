//! Bytejar: binary record persistence for fixed- and variable-layout types.
//!
//! The crate provides:
//! - A bounds-checked, position-tracking byte cursor (`cursor`)
//! - Raw-image persistence for pure-value types (`codec::flat`)
//! - Fixed-width records for types mixing flat and owning fields
//!   (`codec::mixed`)
//! - Size-prefixed, version-tagged framing for variable-length elements
//!   (`codec::framed`)
//! - File/stream/buffer sink adapters (`sink`) and path-level helpers (`io`)
//!
//! Encoded bytes use host byte order and host struct layout; they are a
//! persistence format, not an interchange format.
//!
//! # Quick Start
//!
//! ```
//! use bytejar::codec::flat;
//! use bytejar::cursor::ByteCursor;
//!
//! let values: [u64; 4] = [1, 2, 4, 8];
//!
//! let mut buffer = ByteCursor::with_len(32);
//! flat::write_all(&mut buffer, &values).unwrap();
//!
//! buffer.reset();
//! let decoded: Vec<u64> = flat::read_all(&mut buffer).unwrap();
//! assert_eq!(decoded, values);
//! ```

pub mod codec;
pub mod cursor;
pub mod io;
pub mod sink;

// The flat-type capability, re-exported so callers can derive it without
// naming the underlying crate.
pub use bytemuck::{Pod, Zeroable};
