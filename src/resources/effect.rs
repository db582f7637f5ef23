//! Paint effects: polymorphic modifiers stored behind the factory table.

use crate::factory::register_factory;
use crate::flatten::Flattenable;
use crate::geom::Scalar;
use crate::read_buffer::ReadBuffer;
use crate::write_buffer::WriteBuffer;
use std::any::Any;
use std::sync::Arc;

/// A dashed-stroke effect.
#[derive(Debug, Clone, PartialEq)]
pub struct DashEffect {
    intervals: Vec<Scalar>,
    phase: Scalar,
}

impl DashEffect {
    /// The canonical factory name.
    pub const TYPE_NAME: &'static str = "DashEffect";

    /// Creates a dash effect from its on/off intervals.
    pub fn new(intervals: Vec<Scalar>, phase: Scalar) -> Self {
        Self { intervals, phase }
    }

    /// The on/off intervals.
    pub fn intervals(&self) -> &[Scalar] {
        &self.intervals
    }

    /// The phase offset into the first interval.
    pub fn phase(&self) -> Scalar {
        self.phase
    }

    /// Registers the factory in the global registry.
    pub fn register() {
        register_factory(Self::TYPE_NAME, Self::unflatten);
    }

    fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Arc<dyn Flattenable>> {
        let count = buffer.read_u32();
        if !buffer.can_read_n(count, 4) {
            return None;
        }
        let mut intervals = Vec::with_capacity(count as usize);
        for _ in 0..count {
            intervals.push(buffer.read_scalar());
        }
        let phase = buffer.read_scalar();
        if !buffer.is_valid() {
            return None;
        }
        Some(Arc::new(Self { intervals, phase }))
    }
}

impl Flattenable for DashEffect {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_u32(self.intervals.len() as u32);
        for interval in &self.intervals {
            buffer.write_scalar(*interval);
        }
        buffer.write_scalar(self.phase);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
