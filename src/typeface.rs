//! Typeface identity, recording, and playback.
//!
//! Typefaces are the one resource kind serialized outside the structured
//! buffer: their bodies live in a dedicated archive section that must be
//! decoded before the buffer, so paints and text blobs can refer to them
//! by index.
//!
//! Encoding deduplicates by identity through [`TypefaceSet`]. Decoding
//! builds a [`TypefacePlayback`] table that never holds a null: a body
//! that fails to deserialize is replaced by the process-default typeface,
//! which is the format's single non-fatal failure path.

use crate::error::Result;
use crate::stream::{read_exact_vec, to_u32, ReadStream, WriteStream};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, OnceLock};
use twox_hash::XxHash64;

/// A font face descriptor.
///
/// The codec treats the body as a black box: it round-trips through the
/// standalone [`serialize`](Typeface::serialize) /
/// [`deserialize`](Typeface::deserialize) pair and is never inspected by
/// the archive layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typeface {
    family: String,
    weight: u16,
    italic: bool,
}

static DEFAULT_TYPEFACE: LazyLock<Arc<Typeface>> =
    LazyLock::new(|| Arc::new(Typeface::new("sans-serif", 400, false)));

impl Typeface {
    /// Creates a typeface descriptor.
    pub fn new(family: &str, weight: u16, italic: bool) -> Self {
        Self { family: family.to_owned(), weight, italic }
    }

    /// The process-default typeface substituted for undecodable bodies.
    pub fn default_typeface() -> Arc<Typeface> {
        DEFAULT_TYPEFACE.clone()
    }

    /// The family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The weight class.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Whether the face is italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Stable identity of this face, used to deduplicate during encoding.
    ///
    /// Hashes the descriptor with the same seeded hasher on every process,
    /// so identity survives the encode/decode boundary.
    pub fn id(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        self.family.hash(&mut hasher);
        self.weight.hash(&mut hasher);
        self.italic.hash(&mut hasher);
        hasher.finish()
    }

    /// Writes the standalone body: a length-prefixed opaque blob.
    pub fn serialize(&self, stream: &mut dyn WriteStream) -> Result<()> {
        let body = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| crate::error::PicarcError::Serialization(e.to_string()))?;
        stream.write_u32(to_u32(body.len())?)?;
        stream.write(&body)
    }

    /// Reads one standalone body.
    ///
    /// `Ok(None)` means the length prefix was honored but the body itself
    /// was garbage; the caller substitutes the default face and the stream
    /// stays aligned on the next section. Stream-level failures are fatal.
    pub fn deserialize(stream: &mut dyn ReadStream) -> Result<Option<Arc<Typeface>>> {
        let len = stream.read_u32()? as usize;
        let body = read_exact_vec(stream, len)?;
        let decoded = bincode::serde::decode_from_slice::<Typeface, _>(
            &body,
            bincode::config::standard(),
        );
        match decoded {
            Ok((face, consumed)) if consumed == body.len() => Ok(Some(Arc::new(face))),
            _ => Ok(None),
        }
    }
}

/// Encode-side deduplicating recorder of typeface identities.
///
/// Indices handed out are 1-based: the buffer reserves 0 for "no
/// typeface".
#[derive(Debug, Default)]
pub struct TypefaceSet {
    faces: Vec<Arc<Typeface>>,
    indices: std::collections::HashMap<u64, u32>,
}

impl TypefaceSet {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a face, deduplicating by identity; returns its 1-based index.
    pub fn record(&mut self, face: &Arc<Typeface>) -> u32 {
        let id = face.id();
        if let Some(&index) = self.indices.get(&id) {
            return index;
        }
        self.faces.push(face.clone());
        let index = self.faces.len() as u32;
        self.indices.insert(id, index);
        index
    }

    /// Number of distinct faces recorded.
    pub fn count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The recorded faces, in first-appearance order.
    pub fn faces(&self) -> &[Arc<Typeface>] {
        &self.faces
    }
}

/// Decode-side `index → typeface` table.
///
/// Installed at most once per picture; an install on an already-populated
/// table is ignored. The table never contains a null entry.
#[derive(Debug, Default)]
pub struct TypefacePlayback {
    faces: OnceLock<Vec<Arc<Typeface>>>,
}

impl TypefacePlayback {
    /// Creates an empty, uninstalled table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the decoded faces.
    pub fn install(&self, faces: Vec<Arc<Typeface>>) {
        let _ = self.faces.set(faces);
    }

    /// Number of installed faces; zero when uninstalled.
    pub fn count(&self) -> usize {
        self.faces.get().map_or(0, Vec::len)
    }

    /// Looks up the face at 0-based `index`.
    pub fn get(&self, index: usize) -> Option<Arc<Typeface>> {
        self.faces.get()?.get(index).cloned()
    }
}
