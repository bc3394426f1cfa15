//! Protocol error type.
//!
//! Kept separate from the client error taxonomy: this crate only knows about
//! encoding and channel naming, so its errors are limited to those concerns.
//! Higher layers wrap these into their own error types at the boundary.

use thiserror::Error;

/// Errors produced while encoding or decoding wire payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload bytes did not decode as the expected frame shape.
    #[error("decode failed: {reason}")]
    Decode {
        /// Serde error description.
        reason: String,
    },

    /// Payload could not be encoded (pathological, but never panics).
    #[error("encode failed: {reason}")]
    Encode {
        /// Serde error description.
        reason: String,
    },

    /// Topic string did not match any known channel pattern.
    #[error("unknown topic: {topic}")]
    UnknownTopic {
        /// The unrecognized topic string.
        topic: String,
    },
}
