//! Text blob: positioned glyph runs, each bound to a typeface.
//!
//! Blobs are the second resource kind (after paints) that pulls typefaces
//! through the buffer's recorder, so a picture whose only text lives in
//! blobs still populates the archive's typeface section.

use crate::geom::{Point, Rect};
use crate::read_buffer::ReadBuffer;
use crate::typeface::Typeface;
use crate::write_buffer::WriteBuffer;
use std::sync::Arc;

/// One glyph run: a typeface, an origin, and glyph ids.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    typeface: Arc<Typeface>,
    origin: Point,
    glyphs: Vec<u16>,
}

impl TextRun {
    /// Creates a run.
    pub fn new(typeface: Arc<Typeface>, origin: Point, glyphs: Vec<u16>) -> Self {
        Self { typeface, origin, glyphs }
    }

    /// The run's typeface.
    pub fn typeface(&self) -> &Arc<Typeface> {
        &self.typeface
    }

    /// The run's origin.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The glyph ids.
    pub fn glyphs(&self) -> &[u16] {
        &self.glyphs
    }
}

/// An immutable bundle of glyph runs with precomputed bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlob {
    bounds: Rect,
    runs: Vec<TextRun>,
}

impl TextBlob {
    /// Creates a blob.
    pub fn new(bounds: Rect, runs: Vec<TextRun>) -> Self {
        Self { bounds, runs }
    }

    /// The blob's bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The glyph runs.
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub(crate) fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_rect(&self.bounds);
        buffer.write_u32(self.runs.len() as u32);
        for run in &self.runs {
            buffer.write_typeface(Some(&run.typeface));
            buffer.write_point(&run.origin);
            let mut glyph_bytes = Vec::with_capacity(run.glyphs.len() * 2);
            for glyph in &run.glyphs {
                glyph_bytes.extend_from_slice(&glyph.to_le_bytes());
            }
            buffer.write_byte_array(&glyph_bytes);
        }
    }

    pub(crate) fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Self> {
        let bounds = buffer.read_rect()?;
        let run_count = buffer.read_u32();
        // Each run is at least a typeface index, an origin, and a length.
        if !buffer.can_read_n(run_count, 16) {
            return None;
        }
        let mut runs = Vec::with_capacity(run_count as usize);
        for _ in 0..run_count {
            let typeface = buffer.read_typeface();
            if !buffer.validate(typeface.is_some()) {
                return None;
            }
            let origin = buffer.read_point()?;
            let glyph_bytes = buffer.read_byte_array()?;
            if !buffer.validate(glyph_bytes.len() % 2 == 0) {
                return None;
            }
            let glyphs = glyph_bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            runs.push(TextRun::new(typeface?, origin, glyphs));
        }
        Some(Self::new(bounds, runs))
    }
}
