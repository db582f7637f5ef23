#![allow(missing_docs)]

use picarc::format::{
    PictInfo, BUFFER_SIZE_TAG, EOF_TAG, FACTORY_TAG, PAINT_BUFFER_TAG, PATH_BUFFER_TAG,
    PICTURE_TAG, READER_TAG,
};
use picarc::geom::{Point, Rect};
use picarc::resources::effect::DashEffect;
use picarc::resources::paint::{Paint, PaintStyle};
use picarc::resources::path::Path;
use picarc::stream::{MemReader, ReadStream, StreamWriter, WriteStream};
use picarc::{DeserialProcs, PictureData, PictureRecord, Result, SerialProcs};

fn encode_data(record: PictureRecord) -> Result<Vec<u8>> {
    let data = PictureData::from_record(record, PictInfo::current(Rect::EMPTY));
    let mut sink = StreamWriter::new(Vec::new());
    data.serialize(&mut sink, &SerialProcs::default())?;
    Ok(sink.into_inner())
}

fn decode_data(bytes: &[u8]) -> Result<PictureData> {
    let mut source = MemReader::new(bytes);
    PictureData::from_stream(&mut source, PictInfo::current(Rect::EMPTY), &DeserialProcs::default())
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn push_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

#[test]
fn empty_picture_byte_layout() -> Result<()> {
    let bytes = encode_data(PictureRecord::default())?;

    let mut expected = Vec::new();
    push_u32(&mut expected, READER_TAG);
    push_u32(&mut expected, 0);
    push_u32(&mut expected, FACTORY_TAG);
    push_u32(&mut expected, 4);
    push_u32(&mut expected, 0);
    push_u32(&mut expected, BUFFER_SIZE_TAG);
    push_u32(&mut expected, 0);
    push_u32(&mut expected, EOF_TAG);
    assert_eq!(bytes, expected);

    let decoded = decode_data(&bytes)?;
    assert!(decoded.op_data().is_empty());
    Ok(())
}

#[test]
fn paint_and_path_sections() -> Result<()> {
    let record = PictureRecord {
        paints: vec![Paint::new(0xff01_0203, 1.5, PaintStyle::Stroke)],
        paths: vec![Path::new(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)], false)],
        ..Default::default()
    };
    let bytes = encode_data(record)?;

    // Outer framing: READER(0), FACTORY(4, count 0), then the buffer.
    assert_eq!(u32_at(&bytes, 0), READER_TAG);
    assert_eq!(u32_at(&bytes, 4), 0);
    assert_eq!(u32_at(&bytes, 8), FACTORY_TAG);
    assert_eq!(u32_at(&bytes, 20), BUFFER_SIZE_TAG);

    // Buffer: a paint section of size 1, then a path section whose
    // payload opens with the redundant int32 count.
    let buffer = 28;
    assert_eq!(u32_at(&bytes, buffer), PAINT_BUFFER_TAG);
    assert_eq!(u32_at(&bytes, buffer + 4), 1);
    // Paint: color, width, style, typeface index 0, effect index 0.
    assert_eq!(u32_at(&bytes, buffer + 8), 0xff01_0203);
    let path_section = buffer + 8 + 20;
    assert_eq!(u32_at(&bytes, path_section), PATH_BUFFER_TAG);
    assert_eq!(u32_at(&bytes, path_section + 4), 1);
    assert_eq!(u32_at(&bytes, path_section + 8), 1);

    let decoded = decode_data(&bytes)?;
    assert_eq!(decoded.paints().len(), 1);
    assert_eq!(decoded.paths().len(), 1);
    Ok(())
}

#[test]
fn picture_section_accepted_before_buffer() -> Result<()> {
    let child_bytes = {
        let child = picarc::Picture::new(
            PictureRecord { op_data: vec![5, 6, 7], ..Default::default() },
            Rect::new(0.0, 0.0, 4.0, 4.0),
        );
        let mut sink = StreamWriter::new(Vec::new());
        child.serialize(&mut sink, &SerialProcs::default())?;
        sink.into_inner()
    };

    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 4);
    bytes.extend_from_slice(&[1, 2, 3, 4]);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, PICTURE_TAG);
    push_u32(&mut bytes, 1);
    bytes.extend_from_slice(&child_bytes);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, EOF_TAG);

    let decoded = decode_data(&bytes)?;
    assert_eq!(decoded.op_data(), &[1u8, 2, 3, 4][..]);
    assert_eq!(decoded.pictures().len(), 1);
    assert_eq!(decoded.pictures()[0].data().op_data(), &[5u8, 6, 7][..]);
    Ok(())
}

#[test]
fn eof_only_archive_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, EOF_TAG);
    assert!(decode_data(&bytes).is_err());
}

#[test]
fn missing_op_data_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, EOF_TAG);
    assert!(decode_data(&bytes).is_err());
}

#[test]
fn buffer_before_factory_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, EOF_TAG);
    assert!(decode_data(&bytes).is_err());
}

#[test]
fn unknown_outer_tag_is_tolerated() -> Result<()> {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, u32::from_be_bytes(*b"wat?"));
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, EOF_TAG);

    assert!(decode_data(&bytes).is_ok());
    Ok(())
}

#[test]
fn unknown_buffer_tag_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 8);
    push_u32(&mut bytes, u32::from_be_bytes(*b"wat?"));
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, EOF_TAG);

    assert!(decode_data(&bytes).is_err());
}

#[test]
fn unresolved_factory_name_is_lazy() -> Result<()> {
    // A never-registered name in the factory section is fine on its own.
    let name = b"NoSuchEffect";
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4 + 1 + name.len() as u32);
    push_u32(&mut bytes, 1);
    bytes.push(name.len() as u8);
    bytes.extend_from_slice(name);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, EOF_TAG);

    assert!(decode_data(&bytes).is_ok());
    Ok(())
}

#[test]
fn unresolved_factory_name_fails_when_invoked() -> Result<()> {
    DashEffect::register();
    let record = PictureRecord {
        op_data: vec![1],
        paints: vec![Paint::new(0xff00_0000, 1.0, PaintStyle::Stroke)
            .with_effect(std::sync::Arc::new(DashEffect::new(vec![1.0, 1.0], 0.0)))],
        ..Default::default()
    };
    let mut bytes = encode_data(record)?;

    // Corrupt the registered name in place; the paint that references the
    // factory slot now hits an unresolvable entry.
    let name = DashEffect::TYPE_NAME.as_bytes();
    let pos = bytes
        .windows(name.len())
        .position(|w| w == name)
        .expect("factory name should be on the wire");
    bytes[pos] = b'X';

    assert!(decode_data(&bytes).is_err());
    Ok(())
}

#[test]
fn packed_uint_round_trips() -> Result<()> {
    let values = [0u64, 1, 42, 254, 255, 256, 300, 65_535, u64::from(u32::MAX)];

    let mut sink = StreamWriter::new(Vec::new());
    for value in values {
        sink.write_packed_uint(value)?;
    }
    let bytes = sink.into_inner();

    let mut source = MemReader::new(&bytes);
    for value in values {
        assert_eq!(source.read_packed_uint()?, value);
    }
    assert_eq!(source.remaining(), Some(0));

    // The two wire forms are exactly one and five bytes.
    let mut sink = StreamWriter::new(Vec::new());
    sink.write_packed_uint(254)?;
    assert_eq!(sink.bytes_written(), 1);
    sink.write_packed_uint(255)?;
    assert_eq!(sink.bytes_written(), 6);
    Ok(())
}

#[test]
fn oversized_packed_uint_is_rejected() {
    let mut sink = StreamWriter::new(Vec::new());
    assert!(sink.write_packed_uint(u64::from(u32::MAX) + 1).is_err());
}
