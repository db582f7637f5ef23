//! Path: point geometry with a lazily cached bounding rect.

use crate::geom::{Point, Rect};
use crate::read_buffer::ReadBuffer;
use crate::write_buffer::WriteBuffer;
use std::sync::OnceLock;

/// A polyline path.
///
/// The bounds rect is computed on first use and cached; after decode the
/// whole array is materialized once so playback never pays for it.
#[derive(Debug, Clone, Default)]
pub struct Path {
    points: Vec<Point>,
    closed: bool,
    bounds: OnceLock<Rect>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        // The bounds cache is derived state.
        self.points == other.points && self.closed == other.closed
    }
}

impl Path {
    /// Creates a path from its points.
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed, bounds: OnceLock::new() }
    }

    /// The path's points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether the contour is closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The bounding rect, computed on first call.
    pub fn bounds(&self) -> Rect {
        *self.bounds.get_or_init(|| Rect::bounds_of(&self.points))
    }

    /// Forces the bounds cache to be populated.
    pub fn update_bounds_cache(&self) {
        let _ = self.bounds();
    }

    pub(crate) fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_u32(self.points.len() as u32);
        buffer.write_u32(u32::from(self.closed));
        for point in &self.points {
            buffer.write_point(point);
        }
    }

    pub(crate) fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Self> {
        let count = buffer.read_u32();
        if !buffer.can_read_n(count, 8) {
            return None;
        }
        let closed = buffer.read_u32();
        if !buffer.validate(closed <= 1) {
            return None;
        }
        let mut points = Vec::with_capacity(count as usize);
        for _ in 0..count {
            points.push(buffer.read_point()?);
        }
        Some(Self::new(points, closed == 1))
    }
}
