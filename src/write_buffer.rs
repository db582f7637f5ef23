//! The typed append-only sink used to build the structured resource buffer.
//!
//! During encoding, resources are not written straight to the output
//! stream: they are flattened into this scratch buffer first, because the
//! factory and typeface sections — whose contents are a *side effect* of
//! flattening — must land on the stream before the buffer does.
//!
//! Every append keeps the buffer 4-byte aligned, so the matching reads can
//! validate alignment instead of trusting the payload. The buffer owns the
//! archive's [`FactorySet`] and borrows the typeface recorder shared with
//! any sub-pictures; recording happens transparently when a typeface
//! reference or a polymorphic flattenable is written.

use crate::error::Result;
use crate::factory::FactorySet;
use crate::flatten::Flattenable;
use crate::geom::{Point, Rect, Scalar};
use crate::procs::SerialProcs;
use crate::resources::image::Image;
use crate::resources::paint::Paint;
use crate::resources::path::Path;
use crate::resources::text_blob::TextBlob;
use crate::resources::vertices::Vertices;
use crate::stream::WriteStream;
use crate::typeface::{Typeface, TypefaceSet};
use std::cell::RefCell;
use std::sync::Arc;

/// Typed write cursor over an in-memory, 4-byte-aligned byte sink.
#[derive(Debug)]
pub struct WriteBuffer<'a> {
    bytes: Vec<u8>,
    factories: FactorySet,
    typefaces: &'a RefCell<TypefaceSet>,
    procs: SerialProcs,
}

impl<'a> WriteBuffer<'a> {
    /// Creates a buffer recording typefaces into `typefaces`.
    pub fn new(typefaces: &'a RefCell<TypefaceSet>, procs: SerialProcs) -> Self {
        Self { bytes: Vec::new(), factories: FactorySet::new(), typefaces, procs }
    }

    /// Current payload length.
    pub fn bytes_written(&self) -> usize {
        self.bytes.len()
    }

    /// Copies the accumulated bytes out to a stream.
    pub fn write_to_stream(&self, stream: &mut dyn WriteStream) -> Result<()> {
        stream.write(&self.bytes)
    }

    pub(crate) fn factory_set(&self) -> &FactorySet {
        &self.factories
    }

    fn pad_to_alignment(&mut self) {
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
    }

    /// Appends one little-endian 32-bit word.
    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends one little-endian signed 32-bit word.
    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends one scalar as its bit pattern.
    pub fn write_scalar(&mut self, value: Scalar) {
        self.write_u32(value.to_bits());
    }

    /// Appends raw bytes, padding the buffer back to 4-byte alignment.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.pad_to_alignment();
    }

    /// Appends a length-prefixed, padded byte array.
    pub fn write_byte_array(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_bytes(bytes);
    }

    /// Appends a point as two scalars.
    pub fn write_point(&mut self, point: &Point) {
        self.write_scalar(point.x);
        self.write_scalar(point.y);
    }

    /// Appends a rect as four scalars.
    pub fn write_rect(&mut self, rect: &Rect) {
        self.write_scalar(rect.left);
        self.write_scalar(rect.top);
        self.write_scalar(rect.right);
        self.write_scalar(rect.bottom);
    }

    /// Appends a typeface reference, recording the face.
    ///
    /// Writes the face's 1-based index in the archive's typeface section;
    /// 0 encodes "no typeface".
    pub fn write_typeface(&mut self, face: Option<&Arc<Typeface>>) {
        match face {
            None => self.write_u32(0),
            Some(face) => {
                let index = self.typefaces.borrow_mut().record(face);
                self.write_u32(index);
            }
        }
    }

    /// Appends a polymorphic flattenable, recording its factory.
    ///
    /// Wire form: 1-based factory index, byte length of the body
    /// (back-patched after flattening), body. `None` is the single word 0.
    pub fn write_flattenable(&mut self, obj: Option<&dyn Flattenable>) {
        let Some(obj) = obj else {
            self.write_u32(0);
            return;
        };
        let index = self.factories.record(obj.type_name());
        self.write_u32(index);
        let len_pos = self.bytes.len();
        self.write_u32(0);
        let start = self.bytes.len();
        obj.flatten(self);
        let size = (self.bytes.len() - start) as u32;
        self.bytes[len_pos..len_pos + 4].copy_from_slice(&size.to_le_bytes());
    }

    /// Appends a paint.
    pub fn write_paint(&mut self, paint: &Paint) {
        paint.flatten(self);
    }

    /// Appends a path.
    pub fn write_path(&mut self, path: &Path) {
        path.flatten(self);
    }

    /// Appends an image as a length-prefixed encoded blob.
    ///
    /// The host's image proc is consulted first; when it declines, the
    /// built-in body codec runs.
    pub fn write_image(&mut self, image: &Image) -> Result<()> {
        let encoded = match &self.procs.image {
            Some(proc) => proc(image),
            None => None,
        };
        let encoded = match encoded {
            Some(bytes) => bytes,
            None => image.encode()?,
        };
        self.write_byte_array(&encoded);
        Ok(())
    }

    /// Appends a text blob.
    pub fn write_text_blob(&mut self, blob: &TextBlob) {
        blob.flatten(self);
    }

    /// Appends a vertex object as a length-prefixed encoded blob.
    pub fn write_vertices(&mut self, vertices: &Vertices) -> Result<()> {
        let encoded = vertices.encode()?;
        self.write_byte_array(&encoded);
        Ok(())
    }

    /// Appends a nested picture: its header, then the in-buffer body
    /// variant (which carries drawables and ends with an EOF word).
    pub fn write_picture(&mut self, picture: &crate::picture::Picture) -> Result<()> {
        crate::encode::flatten_picture(picture, self)
    }
}
