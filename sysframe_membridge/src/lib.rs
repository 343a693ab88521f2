//! Named shared-memory segments whose payload is always one serialized
//! value.
//!
//! A segment is a POSIX shared-memory object holding a small header (the
//! payload capacity and a process-shared mutex) followed by the payload.
//! Writers grow the segment on demand; the mutex serializes every read and
//! write, so concurrent users see whole values, never a mixture.
//!
//! The four public operations are [`create_memory`], [`remove_memory`],
//! [`write_memory`], and [`read_memory`]. The payload's shape is delegated
//! entirely to the serializer: a write encodes, a read decodes.

mod bridge;
mod error;
mod segment;

mod segment_test;

pub use bridge::{create_memory, read_memory, remove_memory, write_memory};
pub use error::{Error, SegmentError};
