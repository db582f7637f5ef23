//! Image: raster pixels stored as an opaque encoded blob.

use crate::error::{PicarcError, Result};
use serde::{Deserialize, Serialize};

/// A decoded raster image.
///
/// The archive stores images as length-prefixed encoded blobs. The
/// built-in codec below is used unless the host installs image procs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Creates an image from raw pixel bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encodes to the built-in blob format.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| PicarcError::Serialization(e.to_string()))
    }

    /// Decodes from the built-in blob format.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match bincode::serde::decode_from_slice::<Image, _>(bytes, bincode::config::standard()) {
            Ok((image, consumed)) if consumed == bytes.len() => Some(image),
            _ => None,
        }
    }
}
