//! The validating read cursor over the structured resource buffer.
//!
//! A [`ReadBuffer`] carries a **sticky validity flag**: any bounds
//! violation, malformed body, or explicit [`validate`](ReadBuffer::validate)
//! failure latches the buffer invalid, after which primitive reads return
//! zero and composite reads return `None`. This lets deeply nested resource
//! decoders run to completion without threading a result through every
//! call; the parse loop checks [`is_valid`](ReadBuffer::is_valid) once per
//! iteration and the archive as a whole is rejected if the latch ever
//! tripped.
//!
//! Sizes supplied by the input are pre-validated against the remaining
//! byte budget ([`can_read_n`](ReadBuffer::can_read_n)) before any
//! allocation is made for them.

use crate::factory::FactoryPlayback;
use crate::flatten::Flattenable;
use crate::geom::{Point, Rect, Scalar};
use crate::procs::DeserialProcs;
use crate::resources::image::Image;
use crate::resources::paint::Paint;
use crate::resources::path::Path;
use crate::resources::text_blob::TextBlob;
use crate::resources::vertices::Vertices;
use crate::typeface::{Typeface, TypefacePlayback};
use std::sync::Arc;

/// Returns `true` if a wire count fits a signed 32-bit index space.
pub(crate) fn fits_in_i32(value: u32) -> bool {
    value <= i32::MAX as u32
}

fn align4(len: usize) -> Option<usize> {
    len.checked_add(3).map(|n| n & !3)
}

/// Validating typed cursor over an in-memory byte range.
#[derive(Debug)]
pub struct ReadBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    valid: bool,
    version: u32,
    factories: Option<Arc<FactoryPlayback>>,
    typefaces: Arc<TypefacePlayback>,
    procs: DeserialProcs,
}

impl<'a> ReadBuffer<'a> {
    /// Creates a cursor over `data` for an archive at `version`.
    pub fn new(data: &'a [u8], version: u32) -> Self {
        Self {
            data,
            pos: 0,
            valid: true,
            version,
            factories: None,
            typefaces: Arc::new(TypefacePlayback::new()),
            procs: DeserialProcs::default(),
        }
    }

    /// Installs the factory table flattenable reads resolve through.
    pub fn set_factory_playback(&mut self, playback: Arc<FactoryPlayback>) {
        self.factories = Some(playback);
    }

    /// Installs the typeface table typeface reads resolve through.
    pub fn set_typeface_playback(&mut self, playback: Arc<TypefacePlayback>) {
        self.typefaces = playback;
    }

    /// Installs the host's deserialization overrides.
    pub fn set_deserial_procs(&mut self, procs: DeserialProcs) {
        self.procs = procs;
    }

    /// The archive version gating decode decisions.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    /// Returns `true` once the cursor has consumed every byte.
    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns `true` while no failure has latched.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Unread bytes.
    pub fn available(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Latches invalidity when `cond` is false; returns the validity.
    pub fn validate(&mut self, cond: bool) -> bool {
        if !cond {
            self.valid = false;
        }
        self.valid
    }

    /// Pre-allocation guard: can `count` elements of `elem_size` bytes
    /// still fit in the unread range?
    pub fn can_read_n(&mut self, count: u32, elem_size: usize) -> bool {
        let budget = u64::from(count).checked_mul(elem_size as u64);
        let fits = budget.is_some_and(|n| n <= self.available() as u64);
        self.validate(fits)
    }

    fn read_raw(&mut self, len: usize) -> Option<&'a [u8]> {
        if !self.valid {
            return None;
        }
        if len > self.available() {
            self.valid = false;
            return None;
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(out)
    }

    /// Reads one little-endian 32-bit word; zero once invalid.
    pub fn read_u32(&mut self) -> u32 {
        match self.read_raw(4) {
            Some(b) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            None => 0,
        }
    }

    /// Reads one little-endian signed 32-bit word; zero once invalid.
    pub fn read_i32(&mut self) -> i32 {
        self.read_u32() as i32
    }

    /// Reads one scalar from its bit pattern; zero once invalid.
    pub fn read_scalar(&mut self) -> Scalar {
        f32::from_bits(self.read_u32())
    }

    /// Reads `len` raw bytes, consuming their alignment padding.
    pub fn read_bytes(&mut self, len: usize) -> Option<Vec<u8>> {
        let padded = match align4(len) {
            Some(padded) => padded,
            None => {
                self.validate(false);
                return None;
            }
        };
        if !self.valid || padded > self.available() {
            self.validate(false);
            return None;
        }
        let out = self.data[self.pos..self.pos + len].to_vec();
        self.pos += padded;
        Some(out)
    }

    /// Reads a length-prefixed, padded byte array.
    pub fn read_byte_array(&mut self) -> Option<Vec<u8>> {
        let len = self.read_u32() as usize;
        if !self.valid {
            return None;
        }
        self.read_bytes(len)
    }

    /// Reads a point.
    pub fn read_point(&mut self) -> Option<Point> {
        let x = self.read_scalar();
        let y = self.read_scalar();
        self.valid.then_some(Point::new(x, y))
    }

    /// Reads a rect.
    pub fn read_rect(&mut self) -> Option<Rect> {
        let left = self.read_scalar();
        let top = self.read_scalar();
        let right = self.read_scalar();
        let bottom = self.read_scalar();
        self.valid.then_some(Rect::new(left, top, right, bottom))
    }

    /// Reads a typeface reference.
    ///
    /// Index 0 is "no typeface" and is not a failure. A non-zero index
    /// that the playback table cannot resolve latches invalidity.
    pub fn read_typeface(&mut self) -> Option<Arc<Typeface>> {
        let index = self.read_u32();
        if !self.valid || index == 0 {
            return None;
        }
        let face = self.typefaces.get(index as usize - 1);
        if face.is_none() {
            self.validate(false);
        }
        face
    }

    /// Reads a polymorphic flattenable through the factory playback.
    ///
    /// Index 0 is "no flattenable". An unresolved factory slot, a body
    /// that fails to decode, or a body that consumes a different number of
    /// bytes than its recorded length all latch invalidity.
    pub fn read_flattenable(&mut self) -> Option<Arc<dyn Flattenable>> {
        let index = self.read_u32();
        if !self.valid || index == 0 {
            return None;
        }
        let factory = self.factories.as_ref().and_then(|p| p.get(index as usize - 1));
        let Some(factory) = factory else {
            self.validate(false);
            return None;
        };
        let size = self.read_u32() as usize;
        if !self.valid || size > self.available() {
            self.validate(false);
            return None;
        }
        let start = self.pos;
        let obj = factory(self);
        if !self.validate(obj.is_some() && self.pos - start == size) {
            return None;
        }
        obj
    }

    /// Reads a paint.
    pub fn read_paint(&mut self) -> Option<Paint> {
        Paint::unflatten(self)
    }

    /// Reads a path.
    pub fn read_path(&mut self) -> Option<Path> {
        Path::unflatten(self)
    }

    /// Reads an image from its length-prefixed encoded blob.
    pub fn read_image(&mut self) -> Option<Arc<Image>> {
        let encoded = self.read_byte_array()?;
        let image = match &self.procs.image {
            Some(proc) => proc(&encoded),
            None => Image::decode(&encoded),
        };
        if image.is_none() {
            self.validate(false);
        }
        image.map(Arc::new)
    }

    /// Reads a text blob.
    pub fn read_text_blob(&mut self) -> Option<Arc<TextBlob>> {
        TextBlob::unflatten(self).map(Arc::new)
    }

    /// Reads a nested picture (header plus in-buffer body).
    pub fn read_picture(&mut self) -> Option<Arc<crate::picture::Picture>> {
        crate::decode::picture_from_buffer(self)
    }

    /// Reads a vertex object from its length-prefixed encoded blob.
    pub fn read_vertices(&mut self) -> Option<Arc<Vertices>> {
        let encoded = self.read_byte_array()?;
        let vertices = Vertices::decode(&encoded);
        if vertices.is_none() {
            self.validate(false);
        }
        vertices.map(Arc::new)
    }
}
