//! The archive encoder.
//!
//! Encoding is a two-pass dance. The factory and typeface sections must
//! precede the resource buffer on the stream, but their contents are only
//! known *after* the resources have been flattened — recording factories
//! and typefaces is a side effect of flattening. So the resources are
//! flattened into an in-memory scratch buffer first, every sub-picture is
//! serialized into a discard sink purely so its typefaces join the shared
//! set, and only then do the sections land on the stream in dependency
//! order: factories, typefaces, buffer, sub-pictures.
//!
//! Typefaces from the entire sub-picture tree are serialized once, into
//! the top-level picture's typeface section; recursive calls share the
//! top-level recorder and emit no section of their own.

use crate::error::Result;
use crate::factory::FactorySet;
use crate::format::{
    BUFFER_SIZE_TAG, DRAWABLE_TAG, EOF_TAG, FACTORY_TAG, IMAGE_BUFFER_TAG, PAINT_BUFFER_TAG,
    PATH_BUFFER_TAG, PICTURE_TAG, READER_TAG, TEXTBLOB_BUFFER_TAG, TYPEFACE_TAG,
    VERTICES_BUFFER_TAG,
};
use crate::picture::{Picture, PictureData};
use crate::procs::SerialProcs;
use crate::stream::{packed_uint_size, to_u32, write_tag_size, NullWriter, WriteStream};
use crate::typeface::TypefaceSet;
use crate::write_buffer::WriteBuffer;
use std::cell::RefCell;

/// Writes `pic`'s header and body.
pub(crate) fn serialize_picture(
    pic: &Picture,
    stream: &mut dyn WriteStream,
    procs: &SerialProcs,
    top_typefaces: Option<&RefCell<TypefaceSet>>,
) -> Result<()> {
    pic.info().write_to_stream(stream)?;
    serialize_data(pic.data(), stream, procs, top_typefaces)
}

/// Writes one archive body.
///
/// `top_typefaces` is `Some` for recursive sub-picture calls: the shared
/// recorder suppresses the local typeface section. Its lifetime is exactly
/// one serialize operation.
pub(crate) fn serialize_data(
    data: &PictureData,
    stream: &mut dyn WriteStream,
    procs: &SerialProcs,
    top_typefaces: Option<&RefCell<TypefaceSet>>,
) -> Result<()> {
    write_tag_size(stream, READER_TAG, to_u32(data.op_data().len())?)?;
    stream.write(data.op_data())?;

    let local_typefaces = RefCell::new(TypefaceSet::new());
    let typefaces = top_typefaces.unwrap_or(&local_typefaces);

    // The bulk of the data is delayed into a scratch buffer so the factory
    // and typeface sections it populates can be written first.
    let mut buffer = WriteBuffer::new(typefaces, procs.clone());
    flatten_resources_into(data, &mut buffer)?;

    // Serialize sub-pictures into a discard sink for the side effect of
    // filling the shared set with their typefaces.
    let mut devnull = NullWriter::new();
    for pic in data.pictures() {
        serialize_picture(pic, &mut devnull, &SerialProcs::default(), Some(typefaces))?;
    }

    write_factories(stream, buffer.factory_set())?;
    if top_typefaces.is_none() && !local_typefaces.borrow().is_empty() {
        write_typefaces(stream, &local_typefaces.borrow())?;
    }

    write_tag_size(stream, BUFFER_SIZE_TAG, to_u32(buffer.bytes_written())?)?;
    buffer.write_to_stream(stream)?;

    if !data.pictures().is_empty() {
        write_tag_size(stream, PICTURE_TAG, to_u32(data.pictures().len())?)?;
        for pic in data.pictures() {
            serialize_picture(pic, stream, procs, Some(typefaces))?;
        }
    }

    stream.write_u32(EOF_TAG)
}

fn write_factories(stream: &mut dyn WriteStream, set: &FactorySet) -> Result<()> {
    let mut size = 4usize;
    for name in set.names() {
        size += packed_uint_size(name.len() as u64) + name.len();
    }

    write_tag_size(stream, FACTORY_TAG, to_u32(size)?)?;
    #[cfg(debug_assertions)]
    let start = stream.bytes_written();

    stream.write_u32(to_u32(set.count())?)?;
    for name in set.names() {
        if name.is_empty() {
            stream.write_packed_uint(0)?;
        } else {
            stream.write_packed_uint(name.len() as u64)?;
            stream.write(name.as_bytes())?;
        }
    }

    #[cfg(debug_assertions)]
    debug_assert_eq!(size, stream.bytes_written() - start);
    Ok(())
}

fn write_typefaces(stream: &mut dyn WriteStream, set: &TypefaceSet) -> Result<()> {
    write_tag_size(stream, TYPEFACE_TAG, to_u32(set.count())?)?;
    for face in set.faces() {
        face.serialize(stream)?;
    }
    Ok(())
}

fn write_tag_size_buf(buffer: &mut WriteBuffer<'_>, tag: u32, size: u32) {
    buffer.write_u32(tag);
    buffer.write_u32(size);
}

/// Emits one tagged section per non-empty resource array, in fixed order.
fn flatten_resources_into(data: &PictureData, buffer: &mut WriteBuffer<'_>) -> Result<()> {
    let n = data.paints().len();
    if n > 0 {
        write_tag_size_buf(buffer, PAINT_BUFFER_TAG, to_u32(n)?);
        for paint in data.paints() {
            buffer.write_paint(paint);
        }
    }

    let n = data.paths().len();
    if n > 0 {
        write_tag_size_buf(buffer, PATH_BUFFER_TAG, to_u32(n)?);
        // The path section carries its count twice; decoders trust this
        // inner one, so both stay on the wire.
        buffer.write_i32(n as i32);
        for path in data.paths() {
            buffer.write_path(path);
        }
    }

    if !data.text_blobs().is_empty() {
        write_tag_size_buf(buffer, TEXTBLOB_BUFFER_TAG, to_u32(data.text_blobs().len())?);
        for blob in data.text_blobs() {
            buffer.write_text_blob(blob);
        }
    }

    if !data.vertices().is_empty() {
        write_tag_size_buf(buffer, VERTICES_BUFFER_TAG, to_u32(data.vertices().len())?);
        for vertices in data.vertices() {
            buffer.write_vertices(vertices)?;
        }
    }

    if !data.images().is_empty() {
        write_tag_size_buf(buffer, IMAGE_BUFFER_TAG, to_u32(data.images().len())?);
        for image in data.images() {
            buffer.write_image(image)?;
        }
    }

    Ok(())
}

/// Writes `pic`'s header and body into a structured buffer.
pub(crate) fn flatten_picture(pic: &Picture, buffer: &mut WriteBuffer<'_>) -> Result<()> {
    pic.info().flatten(buffer);
    flatten_data(pic.data(), buffer)
}

/// The in-buffer body variant, for pictures nested inside another
/// picture's resource buffer.
///
/// Unlike the stream form this one carries drawables, terminates with an
/// EOF word, and stores the op data as a byte array.
pub(crate) fn flatten_data(data: &PictureData, buffer: &mut WriteBuffer<'_>) -> Result<()> {
    write_tag_size_buf(buffer, READER_TAG, to_u32(data.op_data().len())?);
    buffer.write_byte_array(data.op_data());

    if !data.pictures().is_empty() {
        write_tag_size_buf(buffer, PICTURE_TAG, to_u32(data.pictures().len())?);
        for pic in data.pictures() {
            flatten_picture(pic, buffer)?;
        }
    }

    if !data.drawables().is_empty() {
        write_tag_size_buf(buffer, DRAWABLE_TAG, to_u32(data.drawables().len())?);
        for drawable in data.drawables() {
            buffer.write_flattenable(Some(drawable.as_ref()));
        }
    }

    flatten_resources_into(data, buffer)?;
    buffer.write_u32(EOF_TAG);
    Ok(())
}
