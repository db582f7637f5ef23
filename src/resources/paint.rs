//! Paint: fill/stroke state applied by drawing opcodes.

use crate::flatten::Flattenable;
use crate::geom::Scalar;
use crate::read_buffer::ReadBuffer;
use crate::typeface::Typeface;
use crate::write_buffer::WriteBuffer;
use std::sync::Arc;

/// How geometry is rendered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaintStyle {
    /// Fill the interior.
    Fill,
    /// Stroke the outline.
    Stroke,
}

impl PaintStyle {
    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Fill),
            1 => Some(Self::Stroke),
            _ => None,
        }
    }
}

/// Color, stroke, text, and effect state for one drawing operation.
///
/// The optional typeface is recorded into the archive's typeface section
/// when the paint is flattened; the optional effect is a polymorphic
/// flattenable stored behind the factory table.
#[derive(Debug, Clone)]
pub struct Paint {
    color: u32,
    stroke_width: Scalar,
    style: PaintStyle,
    typeface: Option<Arc<Typeface>>,
    effect: Option<Arc<dyn Flattenable>>,
}

impl PartialEq for Paint {
    fn eq(&self, other: &Self) -> bool {
        // Effects compare by factory name; their interiors are opaque.
        let effects_match = match (&self.effect, &other.effect) {
            (None, None) => true,
            (Some(a), Some(b)) => a.type_name() == b.type_name(),
            _ => false,
        };
        self.color == other.color
            && self.stroke_width == other.stroke_width
            && self.style == other.style
            && self.typeface == other.typeface
            && effects_match
    }
}

impl Paint {
    /// Creates a paint without a typeface or effect.
    pub fn new(color: u32, stroke_width: Scalar, style: PaintStyle) -> Self {
        Self { color, stroke_width, style, typeface: None, effect: None }
    }

    /// Attaches a typeface for text operations.
    pub fn with_typeface(mut self, face: Arc<Typeface>) -> Self {
        self.typeface = Some(face);
        self
    }

    /// Attaches a polymorphic effect.
    pub fn with_effect(mut self, effect: Arc<dyn Flattenable>) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The ARGB color.
    pub fn color(&self) -> u32 {
        self.color
    }

    /// The stroke width.
    pub fn stroke_width(&self) -> Scalar {
        self.stroke_width
    }

    /// The paint style.
    pub fn style(&self) -> PaintStyle {
        self.style
    }

    /// The attached typeface, if any.
    pub fn typeface(&self) -> Option<&Arc<Typeface>> {
        self.typeface.as_ref()
    }

    /// The attached effect, if any.
    pub fn effect(&self) -> Option<&Arc<dyn Flattenable>> {
        self.effect.as_ref()
    }

    pub(crate) fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_u32(self.color);
        buffer.write_scalar(self.stroke_width);
        buffer.write_u32(self.style as u32);
        buffer.write_typeface(self.typeface.as_ref());
        buffer.write_flattenable(self.effect.as_deref());
    }

    pub(crate) fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Self> {
        let color = buffer.read_u32();
        let stroke_width = buffer.read_scalar();
        let style = PaintStyle::from_u32(buffer.read_u32());
        if !buffer.validate(style.is_some()) {
            return None;
        }
        let typeface = buffer.read_typeface();
        let effect = buffer.read_flattenable();
        if !buffer.is_valid() {
            return None;
        }
        Some(Self { color, stroke_width, style: style?, typeface, effect })
    }
}
