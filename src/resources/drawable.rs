//! Drawables: polymorphic resources stored behind the factory table.

use crate::factory::register_factory;
use crate::flatten::Flattenable;
use crate::geom::Rect;
use crate::read_buffer::ReadBuffer;
use crate::write_buffer::WriteBuffer;
use std::any::Any;
use std::sync::Arc;

/// A drawable that paints a solid rectangle.
///
/// The built-in drawable; hosts register their own kinds the same way,
/// via [`RectDrawable::register`]-style startup hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct RectDrawable {
    rect: Rect,
    color: u32,
}

impl RectDrawable {
    /// The canonical factory name.
    pub const TYPE_NAME: &'static str = "RectDrawable";

    /// Creates a rect drawable.
    pub fn new(rect: Rect, color: u32) -> Self {
        Self { rect, color }
    }

    /// The rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The fill color.
    pub fn color(&self) -> u32 {
        self.color
    }

    /// Registers the factory in the global registry.
    ///
    /// Idempotent; hosts call this during process init, before any decode.
    pub fn register() {
        register_factory(Self::TYPE_NAME, Self::unflatten);
    }

    fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Arc<dyn Flattenable>> {
        let rect = buffer.read_rect()?;
        let color = buffer.read_u32();
        if !buffer.is_valid() {
            return None;
        }
        Some(Arc::new(Self { rect, color }))
    }
}

impl Flattenable for RectDrawable {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_rect(&self.rect);
        buffer.write_u32(self.color);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
