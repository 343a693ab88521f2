//! A two-layer toolkit for inter-process data exchange: the SBS serializer
//! (`sysframe_sbs`) and the shared-memory bridge (`sysframe_membridge`)
//! layered on top of it.
//!
//! A segment's payload is always one serialized value: [`write_memory`]
//! encodes and copies in, [`read_memory`] copies out and decodes. The
//! serializer is equally usable on its own through [`from_value`] and
//! [`to_value`].

pub use sysframe_membridge::{
    create_memory, read_memory, remove_memory, write_memory, Error, SegmentError,
};
pub use sysframe_sbs::{from_value, to_value, DecodeError, EncodeError, Value};
