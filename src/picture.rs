//! The picture container and its public codec entry points.
//!
//! [`PictureData`] is pure storage: the opcode blob plus one array per
//! resource kind, populated either from a [`PictureRecord`] snapshot or by
//! the decoder. It is immutable once constructed and safe to read
//! concurrently. [`Picture`] pairs the data with its [`PictInfo`] header
//! and exposes the stream entry points; it is the unit sub-picture arrays
//! hold.

use crate::decode;
use crate::encode;
use crate::error::Result;
use crate::factory::FactoryPlayback;
use crate::flatten::Flattenable;
use crate::format::PictInfo;
use crate::geom::Rect;
use crate::procs::{DeserialProcs, SerialProcs};
use crate::resources::image::Image;
use crate::resources::paint::Paint;
use crate::resources::path::Path;
use crate::resources::text_blob::TextBlob;
use crate::resources::vertices::Vertices;
use crate::stream::{ReadStream, WriteStream};
use crate::typeface::TypefacePlayback;
use std::sync::Arc;

/// A recorder snapshot: everything a picture owns, ready to archive.
///
/// Recording itself is out of scope for the codec; hosts fill this in
/// from whatever capture mechanism they use.
#[derive(Debug, Default)]
pub struct PictureRecord {
    /// The opaque opcode blob; may be empty.
    pub op_data: Vec<u8>,
    /// Paints, indexed by opcodes.
    pub paints: Vec<Paint>,
    /// Paths, indexed by opcodes.
    pub paths: Vec<Path>,
    /// Text blobs, indexed by opcodes.
    pub text_blobs: Vec<Arc<TextBlob>>,
    /// Vertex objects, indexed by opcodes.
    pub vertices: Vec<Arc<Vertices>>,
    /// Images, indexed by opcodes.
    pub images: Vec<Arc<Image>>,
    /// Drawables, indexed by opcodes.
    pub drawables: Vec<Arc<dyn Flattenable>>,
    /// Sub-pictures, indexed by opcodes.
    pub pictures: Vec<Arc<Picture>>,
}

/// Storage for one picture: opcode blob, resource arrays, header, and the
/// decode-side playback tables.
///
/// Indices into each array are 0-based and stable for the container's
/// lifetime once decode completes.
#[derive(Debug)]
pub struct PictureData {
    pub(crate) op_data: Option<Vec<u8>>,
    pub(crate) paints: Vec<Paint>,
    pub(crate) paths: Vec<Path>,
    pub(crate) text_blobs: Vec<Arc<TextBlob>>,
    pub(crate) vertices: Vec<Arc<Vertices>>,
    pub(crate) images: Vec<Arc<Image>>,
    pub(crate) drawables: Vec<Arc<dyn Flattenable>>,
    pub(crate) pictures: Vec<Arc<Picture>>,
    pub(crate) info: PictInfo,
    pub(crate) factory_playback: Option<Arc<FactoryPlayback>>,
    pub(crate) tf_playback: Arc<TypefacePlayback>,
}

impl PictureData {
    pub(crate) fn new_empty(info: PictInfo) -> Self {
        Self {
            op_data: None,
            paints: Vec::new(),
            paths: Vec::new(),
            text_blobs: Vec::new(),
            vertices: Vec::new(),
            images: Vec::new(),
            drawables: Vec::new(),
            pictures: Vec::new(),
            info,
            factory_playback: None,
            tf_playback: Arc::new(TypefacePlayback::new()),
        }
    }

    /// Builds a populated container from a recorder snapshot.
    pub fn from_record(record: PictureRecord, info: PictInfo) -> Self {
        let data = Self {
            op_data: Some(record.op_data),
            paints: record.paints,
            paths: record.paths,
            text_blobs: record.text_blobs,
            vertices: record.vertices,
            images: record.images,
            drawables: record.drawables,
            pictures: record.pictures,
            info,
            factory_playback: None,
            tf_playback: Arc::new(TypefacePlayback::new()),
        };
        data.init_for_playback();
        data
    }

    /// Pre-computes derived state the playback path relies on.
    ///
    /// Invoked once after construction or a successful decode; walks the
    /// path array and materializes every bounds cache.
    pub fn init_for_playback(&self) {
        for path in &self.paths {
            path.update_bounds_cache();
        }
    }

    /// The opcode blob; zero-length when the picture draws nothing.
    pub fn op_data(&self) -> &[u8] {
        self.op_data.as_deref().unwrap_or(&[])
    }

    /// The paint array.
    pub fn paints(&self) -> &[Paint] {
        &self.paints
    }

    /// The path array.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// The text-blob array.
    pub fn text_blobs(&self) -> &[Arc<TextBlob>] {
        &self.text_blobs
    }

    /// The vertex-object array.
    pub fn vertices(&self) -> &[Arc<Vertices>] {
        &self.vertices
    }

    /// The image array.
    pub fn images(&self) -> &[Arc<Image>] {
        &self.images
    }

    /// The drawable array.
    pub fn drawables(&self) -> &[Arc<dyn Flattenable>] {
        &self.drawables
    }

    /// The sub-picture array.
    pub fn pictures(&self) -> &[Arc<Picture>] {
        &self.pictures
    }

    /// The header descriptor.
    pub fn info(&self) -> PictInfo {
        self.info
    }

    /// Serializes this container's archive body (no picture header).
    pub fn serialize(&self, stream: &mut dyn WriteStream, procs: &SerialProcs) -> Result<()> {
        encode::serialize_data(self, stream, procs, None)
    }

    /// Decodes an archive body whose header the caller already read.
    ///
    /// Any malformed input fails the whole archive; no partial container
    /// is ever returned.
    pub fn from_stream(
        stream: &mut dyn ReadStream,
        info: PictInfo,
        procs: &DeserialProcs,
    ) -> Result<Self> {
        decode::picture_data_from_stream(stream, info, procs, None)
    }
}

/// A complete picture: header plus data, the unit of archival.
#[derive(Debug)]
pub struct Picture {
    data: PictureData,
}

impl Picture {
    /// Creates a picture from a recorder snapshot.
    pub fn new(record: PictureRecord, cull_rect: Rect) -> Arc<Self> {
        let info = PictInfo::current(cull_rect);
        Arc::new(Self { data: PictureData::from_record(record, info) })
    }

    pub(crate) fn from_data(data: PictureData) -> Self {
        Self { data }
    }

    /// The header descriptor.
    pub fn info(&self) -> PictInfo {
        self.data.info
    }

    /// The picture's cull rect.
    pub fn cull_rect(&self) -> Rect {
        self.data.info.cull_rect()
    }

    /// The underlying container.
    pub fn data(&self) -> &PictureData {
        &self.data
    }

    /// Writes the picture header followed by the archive body.
    pub fn serialize(&self, stream: &mut dyn WriteStream, procs: &SerialProcs) -> Result<()> {
        encode::serialize_picture(self, stream, procs, None)
    }

    /// Reads a complete picture archive.
    ///
    /// Returns an error for any malformed input; a failed decode never
    /// yields a partial picture.
    pub fn from_stream(stream: &mut dyn ReadStream, procs: &DeserialProcs) -> Result<Arc<Self>> {
        decode::picture_from_stream(stream, procs, None)
    }
}
