//! The SBS wire codec: tag catalog, length codec, encoder, and the
//! protocol-dispatching decoders.

mod dec;
mod dec_v1;
mod enc;
mod lengths;
mod tags;


pub use tags::{Tag, EXT_MARKER, PROT_V1, PROT_V2};

use crate::error::{DecodeError, EncodeError};
use crate::value::Value;

/// The maximum number of composite encoders that may be active at once.
///
/// Cycles in the input are not detected directly; the depth bound is the
/// defense against them, as well as against stack exhaustion.
pub const MAX_NEST_DEPTH: usize = 100;

/// Serialize a value. The returned buffer starts with the current protocol
/// marker; the remainder is the value's encoding.
pub fn from_value(value: &Value) -> Result<Vec<u8>, EncodeError> {
    enc::encode(value)
}

/// Deserialize one value from a buffer produced by [`from_value`].
///
/// The first byte selects the decoder: the current protocol is decoded
/// directly, the legacy protocol is delegated to its own read-only decoder,
/// and anything else is rejected as [`DecodeError::InvalidProtocol`].
pub fn to_value(bytes: &[u8]) -> Result<Value, DecodeError> {
    let protocol = match bytes.first() {
        Some(&protocol) => protocol,
        None => {
            return Err(DecodeError::Truncated {
                offset: 0,
                needed: 1,
                len: 0,
            })
        }
    };

    match protocol {
        PROT_V2 => dec::Decoder::new(bytes, 1).decode_single(),
        PROT_V1 => dec_v1::decode(bytes),
        other => Err(DecodeError::InvalidProtocol(other)),
    }
}
