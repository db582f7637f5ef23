//! Defines the physical layout of a picture archive.
//!
//! ## High-Level Structure
//!
//! An archive is a sequence of `(tag, size)` sections terminated by a bare
//! EOF tag. Tags are 32-bit fourcc-style magic constants shared by the
//! encoder and the decoder.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ READER_TAG       size          op-data bytes             │
//! ├──────────────────────────────────────────────────────────┤
//! │ FACTORY_TAG      section_size  count  packed names       │
//! ├──────────────────────────────────────────────────────────┤
//! │ TYPEFACE_TAG     count         typeface bodies           │  (top level only)
//! ├──────────────────────────────────────────────────────────┤
//! │ BUFFER_SIZE_TAG  buffer_size   structured resource bytes │
//! ├──────────────────────────────────────────────────────────┤
//! │ PICTURE_TAG      count         sub-picture archives      │  (optional; may
//! ├──────────────────────────────────────────────────────────┤   also precede
//! │ EOF_TAG                                                  │   the buffer)
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The structured buffer repeats the `(tag, size)` framing for the
//! per-kind resource sections (`PAINT_BUFFER_TAG` and friends); its
//! payloads keep 4-byte alignment, which the raw outer stream does not.
//!
//! ## Ordering
//!
//! The factory and typeface sections must precede the buffer: the buffer's
//! contents reference both by index and cannot be parsed without them.
//! Sub-picture sections may appear on either side of the buffer.
//!
//! ## Versioning
//!
//! Each picture carries a [`PictInfo`] header with a version counter.
//! Streams newer than [`LAST_OWN_TYPEFACES_VERSION`] serialize all
//! typefaces into the top-level picture's typeface section; older streams
//! carry one section per sub-picture.

use crate::error::{PicarcError, Result};
use crate::geom::Rect;
use crate::read_buffer::ReadBuffer;
use crate::stream::{ReadStream, WriteStream};
use crate::write_buffer::WriteBuffer;

/// Builds a fourcc tag from four ASCII bytes.
const fn fourcc(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Opcode blob section (outer stream) or opcode byte array (in buffer).
pub const READER_TAG: u32 = fourcc(*b"read");
/// Factory-name section.
pub const FACTORY_TAG: u32 = fourcc(*b"fact");
/// Typeface section.
pub const TYPEFACE_TAG: u32 = fourcc(*b"tpfc");
/// Sub-picture section.
pub const PICTURE_TAG: u32 = fourcc(*b"pctr");
/// Structured resource buffer section.
pub const BUFFER_SIZE_TAG: u32 = fourcc(*b"aray");
/// End of archive (bare tag, no size word).
pub const EOF_TAG: u32 = fourcc(*b"eof ");

/// Paint array inside the structured buffer.
pub const PAINT_BUFFER_TAG: u32 = fourcc(*b"pnt ");
/// Path array inside the structured buffer.
pub const PATH_BUFFER_TAG: u32 = fourcc(*b"pth ");
/// Text-blob array inside the structured buffer.
pub const TEXTBLOB_BUFFER_TAG: u32 = fourcc(*b"blob");
/// Vertex-object array inside the structured buffer.
pub const VERTICES_BUFFER_TAG: u32 = fourcc(*b"vert");
/// Image array inside the structured buffer.
pub const IMAGE_BUFFER_TAG: u32 = fourcc(*b"imag");
/// Drawable array inside the structured buffer.
pub const DRAWABLE_TAG: u32 = fourcc(*b"draw");

/// Magic bytes opening every picture header.
pub const MAGIC_BYTES: [u8; 8] = *b"picarc10";

/// The version written by this encoder.
pub const CURRENT_VERSION: u32 = 50;

/// The oldest version this decoder accepts.
pub const MIN_VERSION: u32 = 40;

/// Last version whose sub-pictures carried their own typeface sections.
///
/// Streams with a version above this share a single top-level typeface
/// table across the whole sub-picture tree.
pub const LAST_OWN_TYPEFACES_VERSION: u32 = 43;

/// Immutable picture header descriptor.
///
/// Carries the format version that gates decoding decisions, plus the
/// picture's cull rect. Written ahead of every picture body, both on the
/// raw stream and inside structured buffers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PictInfo {
    version: u32,
    cull_rect: Rect,
}

impl PictInfo {
    /// Creates a header with an explicit version.
    pub fn new(version: u32, cull_rect: Rect) -> Self {
        Self { version, cull_rect }
    }

    /// Creates a header at [`CURRENT_VERSION`].
    pub fn current(cull_rect: Rect) -> Self {
        Self::new(CURRENT_VERSION, cull_rect)
    }

    /// The format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The picture's cull rect.
    pub fn cull_rect(&self) -> Rect {
        self.cull_rect
    }

    fn is_supported(version: u32) -> bool {
        (MIN_VERSION..=CURRENT_VERSION).contains(&version)
    }

    /// Writes the header to a raw stream.
    pub fn write_to_stream(&self, stream: &mut dyn WriteStream) -> Result<()> {
        stream.write(&MAGIC_BYTES)?;
        stream.write_u32(self.version)?;
        stream.write_u32(self.cull_rect.left.to_bits())?;
        stream.write_u32(self.cull_rect.top.to_bits())?;
        stream.write_u32(self.cull_rect.right.to_bits())?;
        stream.write_u32(self.cull_rect.bottom.to_bits())
    }

    /// Reads and validates a header from a raw stream.
    pub fn from_stream(stream: &mut dyn ReadStream) -> Result<Self> {
        let mut magic = [0u8; 8];
        stream.read(&mut magic)?;
        if magic != MAGIC_BYTES {
            return Err(PicarcError::Format("bad picture magic".into()));
        }
        let version = stream.read_u32()?;
        if !Self::is_supported(version) {
            return Err(PicarcError::Format(format!("unsupported picture version {version}")));
        }
        let cull_rect = Rect::new(
            f32::from_bits(stream.read_u32()?),
            f32::from_bits(stream.read_u32()?),
            f32::from_bits(stream.read_u32()?),
            f32::from_bits(stream.read_u32()?),
        );
        Ok(Self { version, cull_rect })
    }

    /// Writes the header into a structured buffer.
    pub(crate) fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_bytes(&MAGIC_BYTES);
        buffer.write_u32(self.version);
        buffer.write_rect(&self.cull_rect);
    }

    /// Reads and validates a header from a structured buffer.
    pub(crate) fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Self> {
        let magic = buffer.read_bytes(MAGIC_BYTES.len())?;
        if !buffer.validate(magic == MAGIC_BYTES) {
            return None;
        }
        let version = buffer.read_u32();
        if !buffer.validate(Self::is_supported(version)) {
            return None;
        }
        let cull_rect = buffer.read_rect()?;
        Some(Self { version, cull_rect })
    }
}
