//! Vertex objects: triangle geometry with an opaque encoded form.

use crate::error::{PicarcError, Result};
use crate::geom::Point;
use serde::{Deserialize, Serialize};

/// How the vertex positions assemble into triangles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexMode {
    /// Independent triangles.
    Triangles,
    /// A triangle strip.
    TriangleStrip,
    /// A triangle fan.
    TriangleFan,
}

/// An immutable vertex object.
///
/// The archive stores vertices as length-prefixed byte arrays produced by
/// [`encode`](Vertices::encode); the framing never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertices {
    mode: VertexMode,
    positions: Vec<Point>,
    indices: Vec<u16>,
}

impl Vertices {
    /// Creates a vertex object.
    pub fn new(mode: VertexMode, positions: Vec<Point>, indices: Vec<u16>) -> Self {
        Self { mode, positions, indices }
    }

    /// The assembly mode.
    pub fn mode(&self) -> VertexMode {
        self.mode
    }

    /// The vertex positions.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// The triangle indices.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Encodes to the opaque byte form.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| PicarcError::Serialization(e.to_string()))
    }

    /// Decodes from the opaque byte form.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match bincode::serde::decode_from_slice::<Vertices, _>(bytes, bincode::config::standard())
        {
            Ok((vertices, consumed)) if consumed == bytes.len() => Some(vertices),
            _ => None,
        }
    }
}
