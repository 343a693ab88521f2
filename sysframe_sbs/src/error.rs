use crate::wire::MAX_NEST_DEPTH;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("value nests deeper than {MAX_NEST_DEPTH} composites")]
    NestDepth,

    #[error("failed to allocate space for the output buffer")]
    NoMemory,

    #[error("a length of {0} bytes cannot be represented")]
    UnrepresentableLength(usize),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid bytes object: unknown protocol marker {0}")]
    InvalidProtocol(u8),

    #[error("invalid bytes object: unknown type tag {tag} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },

    #[error("invalid bytes object: needed {needed} bytes at offset {offset} but the buffer holds {len}")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("invalid encoding for {0}")]
    InvalidEncoding(&'static str),

    #[error("failed to construct {kind} value: {reason}")]
    Construct { kind: &'static str, reason: String },

    #[error("encoded value nests deeper than {MAX_NEST_DEPTH} composites")]
    NestDepth,
}
