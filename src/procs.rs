//! Host-supplied serialization overrides.
//!
//! Images frequently have an out-of-band representation (a content store,
//! a GPU cache) that the host can serialize better than the default body
//! codec. These hooks let it intercept image encoding and decoding; every
//! other resource kind always uses its built-in body codec.

use crate::resources::image::Image;
use std::fmt;
use std::sync::Arc;

/// Encodes an image to bytes; `None` falls back to the default codec.
pub type ImageEncodeProc = Arc<dyn Fn(&Image) -> Option<Vec<u8>> + Send + Sync>;

/// Decodes an image from bytes; `None` marks the body as malformed.
pub type ImageDecodeProc = Arc<dyn Fn(&[u8]) -> Option<Image> + Send + Sync>;

/// Optional encode-side overrides, carried by the flatten buffer.
#[derive(Clone, Default)]
pub struct SerialProcs {
    /// Image encoder override.
    pub image: Option<ImageEncodeProc>,
}

impl fmt::Debug for SerialProcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialProcs")
            .field("image", &self.image.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Optional decode-side overrides, carried by the read buffer.
#[derive(Clone, Default)]
pub struct DeserialProcs {
    /// Image decoder override.
    pub image: Option<ImageDecodeProc>,
}

impl fmt::Debug for DeserialProcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeserialProcs")
            .field("image", &self.image.as_ref().map(|_| "..."))
            .finish()
    }
}
