//! The four segment operations. Payloads are always a single serialized
//! value; the codec decides their shape, the segment only carries bytes.

use crate::error::Error;
use crate::segment;
use sysframe_sbs::{from_value, to_value, Value};

/// Create a named segment up front. Optional: [`write_memory`] creates on
/// demand. Returns `false` when the segment already existed and
/// `error_if_exists` is off.
pub fn create_memory(
    name: &str,
    prealloc_size: usize,
    error_if_exists: bool,
) -> Result<bool, Error> {
    Ok(segment::create(name, prealloc_size, error_if_exists)?)
}

/// Unlink a named segment. With `throw_error` off, removing a segment that
/// is already gone reports `false` instead of failing, so removal is
/// idempotent at the caller's option.
pub fn remove_memory(name: &str, throw_error: bool) -> Result<bool, Error> {
    Ok(segment::remove(name, throw_error)?)
}

/// Serialize `value` into the named segment, growing it as needed. With
/// `create` off, writing to a missing segment fails instead of creating it.
pub fn write_memory(name: &str, value: &Value, create: bool) -> Result<bool, Error> {
    let bytes = from_value(value)?;
    let mut seg = segment::open_and_size(name, bytes.len(), create)?;
    seg.payload_mut()[..bytes.len()].copy_from_slice(&bytes);
    Ok(true)
}

/// Deserialize the value held in the named segment. A segment that was
/// created with no capacity and never written reads as [`Value::None`].
pub fn read_memory(name: &str) -> Result<Value, Error> {
    let seg = segment::open_and_size(name, 0, false)?;
    if seg.max_size() == 0 {
        return Ok(Value::None);
    }

    /* The payload stays locked for the whole read-and-decode; the decoded
    value owns every byte it needs before the lock is released. */
    let value = to_value(seg.payload())?;
    drop(seg);
    Ok(value)
}
