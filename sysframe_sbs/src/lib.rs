//! The Structured Bytes Stack (SBS) serializer.
//!
//! SBS is a self-describing, compact, tagged wire format. Values are stacked
//! directly on top of each other: each one starts with a tag byte selecting
//! its type and length-width variant, followed by its length bytes (if any)
//! and its payload. There is no global metadata table and no padding, so the
//! encoding of a value is also its own delimiter.
//!
//! A buffer always begins with a protocol marker byte; [`to_value`] uses it
//! to pick the matching decoder, so old buffers stay readable after a
//! protocol revision. [`from_value`] always emits the current protocol.

mod error;
mod value;
pub mod wire;

pub use error::{DecodeError, EncodeError};
pub use value::Value;
pub use wire::{from_value, to_value};
