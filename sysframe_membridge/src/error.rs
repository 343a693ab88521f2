use std::io;
use sysframe_sbs::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("shared segment {0:?} already exists")]
    AlreadyExists(String),

    #[error("shared segment {0:?} does not exist")]
    NotFound(String),

    #[error("failed to open shared segment {name:?}")]
    OpenFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to map shared segment {name:?}")]
    MapFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to size shared segment {name:?}")]
    TruncateFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize the mutex of shared segment {name:?} (errno {code})")]
    MutexInitFailed { name: String, code: i32 },

    #[error("failed to unlink shared segment {name:?}")]
    UnlinkFailed {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Everything a bridge operation can report: a segment fault, or a codec
/// fault from the payload it carries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
