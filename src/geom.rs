//! Minimal geometry carried by pictures.
//!
//! Only what the archive format itself needs: scalar points for path and
//! vertex data, and axis-aligned rectangles for path bounds and picture
//! cull rects.

use serde::{Deserialize, Serialize};

/// The scalar type used throughout the drawing data.
pub type Scalar = f32;

/// A 2D point.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: Scalar,
    /// Vertical coordinate.
    pub y: Scalar,
}

impl Point {
    /// Constructs a point.
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
///
/// Invariants:
/// - `left <= right` and `top <= bottom` for non-empty rects.
/// - An empty rect is all zeros.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: Scalar,
    /// Top edge.
    pub top: Scalar,
    /// Right edge.
    pub right: Scalar,
    /// Bottom edge.
    pub bottom: Scalar,
}

impl Rect {
    /// The empty rectangle.
    pub const EMPTY: Rect = Rect { left: 0.0, top: 0.0, right: 0.0, bottom: 0.0 };

    /// Constructs a rect from its edges.
    pub fn new(left: Scalar, top: Scalar, right: Scalar, bottom: Scalar) -> Self {
        Self { left, top, right, bottom }
    }

    /// Returns `true` if the rect encloses no area.
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// The tight bounds of a point set; empty when the set is.
    pub fn bounds_of(points: &[Point]) -> Rect {
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return Rect::EMPTY;
        };
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in iter {
            rect.left = rect.left.min(p.x);
            rect.top = rect.top.min(p.y);
            rect.right = rect.right.max(p.x);
            rect.bottom = rect.bottom.max(p.y);
        }
        rect
    }

    /// Returns the union of two rects, ignoring empty inputs.
    pub fn join(&self, other: &Rect) -> Rect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }
}
