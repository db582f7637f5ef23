//! Centralized error handling for picarc.
//!
//! All failure conditions are propagated through the `Result` type; the
//! library contains no panicking paths (enforced by clippy lints on the
//! crate root).
//!
//! ## Error Categories
//!
//! - **I/O Errors** ([`PicarcError::Io`]): failures of the underlying byte
//!   stream.
//! - **Truncation** ([`PicarcError::Truncated`]): the stream ended before a
//!   section it promised.
//! - **Format Errors** ([`PicarcError::Format`]): invalid framing, bad
//!   magic, size claims that exceed the remaining input, or a resource that
//!   failed to deserialize.
//! - **Serialization Errors** ([`PicarcError::Serialization`]): bincode
//!   encoding/decoding of an opaque resource body.
//! - **Internal Errors** ([`PicarcError::Internal`]): logic errors
//!   (should not occur in production).
//!
//! A failed decode never yields a partial picture: the top-level entry
//! points return one of these errors and the caller sees no archive at all.

use std::fmt;
use std::io;
use std::sync::Arc;

/// A specialized `Result` type for picarc operations.
pub type Result<T> = std::result::Result<T, PicarcError>;

/// The master error enum covering all failure domains in picarc.
///
/// The type is `Clone` so errors can be stored or shared across threads;
/// I/O errors are wrapped in `Arc` to keep cloning cheap.
#[derive(Debug, Clone)]
pub enum PicarcError {
    /// Low-level failure of the underlying stream.
    Io(Arc<io::Error>),

    /// The stream ended before a section it promised.
    ///
    /// Every prefix of a valid archive decodes to this (or to `Format`),
    /// never to a partial picture.
    Truncated,

    /// The archive violates the wire format.
    ///
    /// Covers bad magic bytes, unsupported versions, size claims exceeding
    /// the remaining input, unknown buffer tags, missing prerequisite
    /// sections, unresolved factory names, and resources that failed to
    /// deserialize. The string describes the specific violation.
    Format(String),

    /// Encoding or decoding of an opaque resource body failed.
    Serialization(String),

    /// Logic error inside the library; please report as a bug.
    Internal(String),
}

impl fmt::Display for PicarcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O Error: {e}"),
            Self::Truncated => write!(f, "Truncated Archive"),
            Self::Format(s) => write!(f, "Format Error: {s}"),
            Self::Serialization(s) => write!(f, "Serialization Error: {s}"),
            Self::Internal(s) => write!(f, "Internal Logic Error: {s}"),
        }
    }
}

impl std::error::Error for PicarcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PicarcError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
