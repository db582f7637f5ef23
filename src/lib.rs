//! # picarc
//!
//! A self-describing archive codec for recorded 2D drawing pictures: the
//! serializer and deserializer for a picture's opcode blob together with
//! the heap of resources those opcodes reference (paints, paths, images,
//! text blobs, vertex objects, typefaces, drawables, sub-pictures).
//!
//! ## Overview
//!
//! The format has cross-section dependencies: the opcode buffer references
//! resources by index, the resource buffer references typefaces and
//! polymorphic factories by index, and typefaces must be materialized
//! before the resource buffer can be decoded. The codec therefore:
//!
//! *   **Encodes in two passes.** Resources are flattened into an
//!     in-memory scratch buffer whose writes record, as side effects, the
//!     factories and typefaces they touch; sub-pictures are serialized
//!     into a discard sink so their typefaces join the shared set; only
//!     then do the sections land on the stream in dependency order.
//! *   **Decodes defensively.** Every length and index is validated
//!     before use, stream-supplied sizes are checked against the
//!     remaining input before allocation, and any failure rejects the
//!     whole archive — a malformed input never yields a partial picture.
//! *   **Shares typefaces across the picture tree.** A typeface used by
//!     both the top-level picture and a sub-picture is serialized once,
//!     in the top-level typeface section; sub-picture buffers resolve it
//!     through the shared playback table. Streams from older encoders,
//!     which carried a typeface section per sub-picture, still decode.
//!
//! ## Architecture
//!
//! - [`stream`]: the raw byte-stream contracts and tag primitives.
//! - [`format`]: the tag constants, version counters, and picture header.
//! - [`write_buffer`] / [`read_buffer`]: the typed scratch sink and the
//!   validating cursor over the structured resource buffer.
//! - [`factory`] / [`typeface`]: the registries recorded during encoding
//!   and replayed, as index tables, during decoding.
//! - [`resources`]: the concrete resource kinds; their interiors are
//!   opaque to the archive layer.
//! - [`picture`]: the storage container and the public entry points.
//!
//! ## Usage
//!
//! ```rust
//! use picarc::geom::Rect;
//! use picarc::resources::paint::{Paint, PaintStyle};
//! use picarc::stream::{MemReader, StreamWriter};
//! use picarc::{DeserialProcs, Picture, PictureRecord, SerialProcs};
//!
//! let record = PictureRecord {
//!     op_data: vec![1, 2, 3, 4],
//!     paints: vec![Paint::new(0xff00_00ff, 1.0, PaintStyle::Fill)],
//!     ..Default::default()
//! };
//! let picture = Picture::new(record, Rect::new(0.0, 0.0, 64.0, 64.0));
//!
//! let mut sink = StreamWriter::new(Vec::new());
//! picture.serialize(&mut sink, &SerialProcs::default())?;
//! let bytes = sink.into_inner();
//!
//! let mut source = MemReader::new(&bytes);
//! let decoded = Picture::from_stream(&mut source, &DeserialProcs::default())?;
//! assert_eq!(decoded.data().op_data(), &[1u8, 2, 3, 4][..]);
//! assert_eq!(decoded.data().paints().len(), 1);
//! # Ok::<(), picarc::PicarcError>(())
//! ```
//!
//! ## Safety and Error Handling
//!
//! * **No Panics:** no `unwrap()` or `panic!()` in the library (enforced
//!   by clippy lints).
//! * **Comprehensive Errors:** all failures correspond to a
//!   [`PicarcError`] value; decoding malformed or truncated input returns
//!   an error instead of a picture.
//! * **Synchronous:** the codec runs entirely on the caller's thread and
//!   a decoded picture is immutable and safe to read concurrently.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod error;
pub mod factory;
pub mod flatten;
pub mod format;
pub mod geom;
pub mod picture;
pub mod procs;
pub mod read_buffer;
pub mod resources;
pub mod stream;
pub mod typeface;
pub mod write_buffer;

// Private codec internals.
mod decode;
mod encode;

// --- RE-EXPORTS ---

pub use error::{PicarcError, Result};
pub use format::PictInfo;
pub use picture::{Picture, PictureData, PictureRecord};
pub use procs::{DeserialProcs, SerialProcs};
