//! The archive decoder.
//!
//! Two nested `(tag, size)` loops. The outer loop pulls sections off the
//! raw stream and must observe the dependency order the encoder promised:
//! the factory and typeface sections arrive before the resource buffer,
//! because the buffer's contents reference both by index. The inner loop
//! walks the structured buffer under the [`ReadBuffer`] validity latch.
//!
//! Unknown tags are treated asymmetrically: the outer loop tolerates them
//! (consumers rely on that leniency), while the buffer loop rejects them
//! outright. Every other failure — truncation, oversized size claims, a
//! resource body that will not decode, a factory slot with no registration
//! — aborts the whole archive; the sole exception is a typeface body that
//! fails to deserialize, which is silently replaced by the process-default
//! face.

use crate::error::{PicarcError, Result};
use crate::factory::{name_to_factory, FactoryPlayback};
use crate::format::{
    PictInfo, BUFFER_SIZE_TAG, DRAWABLE_TAG, EOF_TAG, FACTORY_TAG, IMAGE_BUFFER_TAG,
    PAINT_BUFFER_TAG, PATH_BUFFER_TAG, PICTURE_TAG, READER_TAG, TEXTBLOB_BUFFER_TAG,
    TYPEFACE_TAG, VERTICES_BUFFER_TAG,
};
use crate::picture::{Picture, PictureData};
use crate::procs::DeserialProcs;
use crate::read_buffer::{fits_in_i32, ReadBuffer};
use crate::stream::{read_exact_vec, ReadStream};
use crate::typeface::{Typeface, TypefacePlayback};
use std::sync::Arc;

/// Reads a picture header and its archive body.
pub(crate) fn picture_from_stream(
    stream: &mut dyn ReadStream,
    procs: &DeserialProcs,
    top_typefaces: Option<&Arc<TypefacePlayback>>,
) -> Result<Arc<Picture>> {
    let info = PictInfo::from_stream(stream)?;
    let data = picture_data_from_stream(stream, info, procs, top_typefaces)?;
    Ok(Arc::new(Picture::from_data(data)))
}

/// Reads one archive body.
///
/// `top_typefaces` is `Some` for recursive sub-picture calls; the
/// top-level archive's own playback doubles as the shared table.
pub(crate) fn picture_data_from_stream(
    stream: &mut dyn ReadStream,
    info: PictInfo,
    procs: &DeserialProcs,
    top_typefaces: Option<&Arc<TypefacePlayback>>,
) -> Result<PictureData> {
    let mut data = PictureData::new_empty(info);
    let top = match top_typefaces {
        Some(playback) => playback.clone(),
        None => data.tf_playback.clone(),
    };
    parse_stream(&mut data, stream, procs, &top)?;
    data.init_for_playback();
    Ok(data)
}

fn parse_stream(
    data: &mut PictureData,
    stream: &mut dyn ReadStream,
    procs: &DeserialProcs,
    top: &Arc<TypefacePlayback>,
) -> Result<()> {
    let mut have_buffer = false;
    loop {
        let tag = stream.read_u32()?;
        if tag == EOF_TAG {
            break;
        }
        let size = stream.read_u32()?;
        parse_stream_tag(data, stream, tag, size, procs, top, &mut have_buffer)?;
    }
    if data.op_data.is_none() {
        // Even a picture that draws nothing carries a zero-length blob.
        return Err(PicarcError::Format("archive carries no op data".into()));
    }
    Ok(())
}

fn parse_stream_tag(
    data: &mut PictureData,
    stream: &mut dyn ReadStream,
    tag: u32,
    size: u32,
    procs: &DeserialProcs,
    top: &Arc<TypefacePlayback>,
    have_buffer: &mut bool,
) -> Result<()> {
    match tag {
        READER_TAG => {
            if data.op_data.is_some() {
                return Err(PicarcError::Format("duplicate op data section".into()));
            }
            data.op_data = Some(read_exact_vec(stream, size as usize)?);
        }
        FACTORY_TAG => {
            // By the time the buffer arrives its dependents must be in
            // place, so a factory section after the buffer is too late.
            if *have_buffer {
                return Err(PicarcError::Format("factory section follows the buffer".into()));
            }
            // The section size is informational; the real count follows.
            let count = stream.read_u32()? as usize;
            if let Some(remaining) = stream.remaining() {
                // Every name costs at least its one-byte length prefix.
                if count > remaining {
                    return Err(PicarcError::Truncated);
                }
            }
            let mut playback = FactoryPlayback::with_count(count);
            for i in 0..count {
                let len = stream.read_packed_uint()? as usize;
                let name = String::from_utf8(read_exact_vec(stream, len)?)
                    .map_err(|_| PicarcError::Format("factory name is not UTF-8".into()))?;
                playback.set(i, name_to_factory(&name));
            }
            data.factory_playback = Some(Arc::new(playback));
        }
        TYPEFACE_TAG => {
            if *have_buffer {
                return Err(PicarcError::Format("typeface section follows the buffer".into()));
            }
            let count = size as usize;
            if let Some(remaining) = stream.remaining() {
                // Every body costs at least its four length bytes.
                if count.saturating_mul(4) > remaining {
                    return Err(PicarcError::Truncated);
                }
            }
            let mut faces = Vec::with_capacity(count);
            for _ in 0..count {
                // A body that fails to deserialize is not fatal: the
                // playback table never holds a null, so the default face
                // stands in.
                let face =
                    Typeface::deserialize(stream)?.unwrap_or_else(Typeface::default_typeface);
                faces.push(face);
            }
            data.tf_playback.install(faces);
        }
        PICTURE_TAG => {
            if !data.pictures.is_empty() {
                return Err(PicarcError::Format("duplicate sub-picture section".into()));
            }
            let mut pictures = Vec::new();
            for _ in 0..size {
                pictures.push(picture_from_stream(stream, procs, Some(top))?);
            }
            data.pictures = pictures;
        }
        BUFFER_SIZE_TAG => {
            let storage = read_exact_vec(stream, size as usize)?;

            let factories = data.factory_playback.clone().ok_or_else(|| {
                PicarcError::Format("resource buffer precedes its factory section".into())
            })?;

            let mut buffer = ReadBuffer::new(&storage, data.info.version());
            buffer.set_factory_playback(factories);
            buffer.set_deserial_procs(procs.clone());

            // Old streams serialized typefaces with each sub-picture; when
            // this archive populated its own table, it wins. Newer streams
            // resolve everything through the top-level table.
            let typefaces = if data.tf_playback.count() > 0 {
                data.tf_playback.clone()
            } else {
                top.clone()
            };
            buffer.set_typeface_playback(typefaces);

            while !buffer.eof() && buffer.is_valid() {
                let tag = buffer.read_u32();
                let size = buffer.read_u32();
                parse_buffer_tag(data, &mut buffer, tag, size);
            }
            if !buffer.is_valid() {
                return Err(PicarcError::Format("invalid resource buffer".into()));
            }
            *have_buffer = true;
        }
        _ => {
            // Unknown outer tags are tolerated; their payload is not
            // skipped. The buffer loop below is the strict one.
        }
    }
    Ok(())
}

/// Reads `count` items through `read`, all or nothing.
///
/// A single failure clears the array and latches invalidity.
fn new_array_from_buffer<T>(
    buffer: &mut ReadBuffer<'_>,
    count: u32,
    array: &mut Vec<T>,
    read: impl Fn(&mut ReadBuffer<'_>) -> Option<T>,
) -> bool {
    if !buffer.validate(array.is_empty() && fits_in_i32(count)) {
        return false;
    }
    if count == 0 {
        return true;
    }
    for _ in 0..count {
        match read(buffer) {
            Some(item) => array.push(item),
            None => {
                buffer.validate(false);
                array.clear();
                return false;
            }
        }
    }
    true
}

pub(crate) fn parse_buffer_tag(
    data: &mut PictureData,
    buffer: &mut ReadBuffer<'_>,
    tag: u32,
    size: u32,
) {
    match tag {
        PAINT_BUFFER_TAG => {
            if !buffer.validate(fits_in_i32(size)) {
                return;
            }
            for _ in 0..size {
                match buffer.read_paint() {
                    Some(paint) => data.paints.push(paint),
                    None => return,
                }
            }
        }
        PATH_BUFFER_TAG => {
            if size > 0 {
                let count = buffer.read_i32();
                if !buffer.validate(count >= 0) {
                    return;
                }
                for _ in 0..count {
                    match buffer.read_path() {
                        Some(path) => data.paths.push(path),
                        None => return,
                    }
                }
            }
        }
        TEXTBLOB_BUFFER_TAG => {
            new_array_from_buffer(buffer, size, &mut data.text_blobs, |b| b.read_text_blob());
        }
        VERTICES_BUFFER_TAG => {
            new_array_from_buffer(buffer, size, &mut data.vertices, |b| b.read_vertices());
        }
        IMAGE_BUFFER_TAG => {
            new_array_from_buffer(buffer, size, &mut data.images, |b| b.read_image());
        }
        READER_TAG => {
            // Preflight the claimed size before the array read allocates.
            if !buffer.can_read_n(size, 1) {
                return;
            }
            let Some(bytes) = buffer.read_byte_array() else {
                return;
            };
            if !buffer.validate(bytes.len() == size as usize && data.op_data.is_none()) {
                return;
            }
            data.op_data = Some(bytes);
        }
        PICTURE_TAG => {
            new_array_from_buffer(buffer, size, &mut data.pictures, |b| b.read_picture());
        }
        DRAWABLE_TAG => {
            new_array_from_buffer(buffer, size, &mut data.drawables, |b| b.read_flattenable());
        }
        _ => {
            // The tag was invalid.
            buffer.validate(false);
        }
    }
}

/// Reads a nested picture (header plus in-buffer body) from a structured
/// buffer.
pub(crate) fn picture_from_buffer(buffer: &mut ReadBuffer<'_>) -> Option<Arc<Picture>> {
    let info = PictInfo::unflatten(buffer)?;
    let data = picture_data_from_buffer(buffer, info)?;
    Some(Arc::new(Picture::from_data(data)))
}

/// Reads one in-buffer archive body, terminated by an EOF word.
pub(crate) fn picture_data_from_buffer(
    buffer: &mut ReadBuffer<'_>,
    info: PictInfo,
) -> Option<PictureData> {
    buffer.set_version(info.version());
    let mut data = PictureData::new_empty(info);

    while buffer.is_valid() {
        let tag = buffer.read_u32();
        if tag == EOF_TAG {
            break;
        }
        let size = buffer.read_u32();
        parse_buffer_tag(&mut data, buffer, tag, size);
    }

    if !buffer.validate(data.op_data.is_some()) {
        return None;
    }
    data.init_for_playback();
    Some(data)
}
