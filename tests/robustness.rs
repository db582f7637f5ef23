#![allow(missing_docs)]

use picarc::factory::register_factory;
use picarc::flatten::Flattenable;
use picarc::format::{
    BUFFER_SIZE_TAG, EOF_TAG, FACTORY_TAG, PAINT_BUFFER_TAG, PATH_BUFFER_TAG, READER_TAG,
    TYPEFACE_TAG,
};
use picarc::geom::{Point, Rect};
use picarc::read_buffer::ReadBuffer;
use picarc::resources::effect::DashEffect;
use picarc::resources::image::Image;
use picarc::resources::paint::{Paint, PaintStyle};
use picarc::resources::path::Path;
use picarc::resources::vertices::{VertexMode, Vertices};
use picarc::stream::{MemReader, StreamWriter};
use picarc::typeface::Typeface;
use picarc::write_buffer::WriteBuffer;
use picarc::{DeserialProcs, Picture, PictureRecord, Result, SerialProcs};
use std::any::Any;
use std::sync::{Arc, OnceLock};

fn encode_picture(picture: &Picture) -> Result<Vec<u8>> {
    let mut sink = StreamWriter::new(Vec::new());
    picture.serialize(&mut sink, &SerialProcs::default())?;
    Ok(sink.into_inner())
}

fn decode_picture(bytes: &[u8]) -> Result<Arc<Picture>> {
    let mut source = MemReader::new(bytes);
    Picture::from_stream(&mut source, &DeserialProcs::default())
}

fn push_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

fn rich_picture() -> Arc<Picture> {
    DashEffect::register();
    let face = Arc::new(Typeface::new("Robust Face", 400, false));
    let child = Picture::new(
        PictureRecord {
            op_data: vec![8, 8, 8],
            paints: vec![Paint::new(0xff44_5566, 0.0, PaintStyle::Fill).with_typeface(face.clone())],
            ..Default::default()
        },
        Rect::new(0.0, 0.0, 8.0, 8.0),
    );
    let record = PictureRecord {
        op_data: (0u8..32).collect(),
        paints: vec![
            Paint::new(0xff00_1122, 1.0, PaintStyle::Stroke)
                .with_typeface(face)
                .with_effect(Arc::new(DashEffect::new(vec![2.0, 1.0], 0.0))),
        ],
        paths: vec![Path::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)], false)],
        vertices: vec![Arc::new(Vertices::new(
            VertexMode::TriangleFan,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)],
            vec![0, 1, 2],
        ))],
        images: vec![Arc::new(Image::new(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]))],
        pictures: vec![child],
        ..Default::default()
    };
    Picture::new(record, Rect::new(0.0, 0.0, 100.0, 100.0))
}

#[test]
fn every_prefix_fails_cleanly() -> Result<()> {
    let bytes = encode_picture(&rich_picture())?;

    for len in 0..bytes.len() {
        assert!(
            decode_picture(&bytes[..len]).is_err(),
            "prefix of {len} bytes decoded as a complete archive"
        );
    }
    Ok(())
}

#[test]
fn single_byte_mutations_terminate() -> Result<()> {
    let bytes = encode_picture(&rich_picture())?;

    for i in 0..bytes.len() {
        let mut mutated = bytes.clone();
        mutated[i] ^= 0xff;
        // Success is allowed (the flip may land in an opaque body); what
        // matters is that decoding terminates without panicking.
        let _ = decode_picture(&mutated);
    }
    Ok(())
}

#[test]
fn oversized_reader_claim_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, u32::MAX);
    bytes.extend_from_slice(&[0; 64]);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

#[test]
fn oversized_buffer_claim_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, 0x4000_0000);
    bytes.extend_from_slice(&[0; 32]);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

#[test]
fn oversized_typeface_count_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, TYPEFACE_TAG);
    push_u32(&mut bytes, 0x4000_0000);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

#[test]
fn oversized_factory_count_is_rejected() {
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0x1000_0000);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

#[test]
fn oversized_paint_count_is_rejected() {
    let mut buffer = Vec::new();
    push_u32(&mut buffer, PAINT_BUFFER_TAG);
    push_u32(&mut buffer, 0x8000_0000);

    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, buffer.len() as u32);
    bytes.extend_from_slice(&buffer);
    push_u32(&mut bytes, EOF_TAG);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

#[test]
fn negative_inner_path_count_is_rejected() {
    let mut buffer = Vec::new();
    push_u32(&mut buffer, PATH_BUFFER_TAG);
    push_u32(&mut buffer, 1);
    buffer.extend_from_slice(&(-1i32).to_le_bytes());

    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, FACTORY_TAG);
    push_u32(&mut bytes, 4);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, BUFFER_SIZE_TAG);
    push_u32(&mut bytes, buffer.len() as u32);
    bytes.extend_from_slice(&buffer);
    push_u32(&mut bytes, EOF_TAG);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

#[test]
fn truncated_typeface_body_is_fatal() {
    // Unlike a garbage body (substituted), a body the stream cannot even
    // supply is a framing failure.
    let mut bytes = Vec::new();
    push_u32(&mut bytes, READER_TAG);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, TYPEFACE_TAG);
    push_u32(&mut bytes, 1);
    push_u32(&mut bytes, 100);
    bytes.extend_from_slice(&[0xee; 10]);

    let mut source = MemReader::new(&bytes);
    assert!(picarc::PictureData::from_stream(
        &mut source,
        picarc::PictInfo::current(Rect::EMPTY),
        &DeserialProcs::default(),
    )
    .is_err());
}

/// An effect whose registered name needs the five-byte packed-uint form.
#[derive(Debug, Clone, PartialEq)]
struct LongNameEffect {
    seed: u32,
}

impl LongNameEffect {
    fn registered_name() -> &'static str {
        static NAME: OnceLock<String> = OnceLock::new();
        NAME.get_or_init(|| "very-long-effect-".repeat(20))
    }

    fn register() {
        register_factory(Self::registered_name(), Self::unflatten);
    }

    fn unflatten(buffer: &mut ReadBuffer<'_>) -> Option<Arc<dyn Flattenable>> {
        let seed = buffer.read_u32();
        buffer.is_valid().then(|| Arc::new(Self { seed }) as Arc<dyn Flattenable>)
    }
}

impl Flattenable for LongNameEffect {
    fn type_name(&self) -> &'static str {
        Self::registered_name()
    }

    fn flatten(&self, buffer: &mut WriteBuffer<'_>) {
        buffer.write_u32(self.seed);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn long_factory_name_round_trips() -> Result<()> {
    LongNameEffect::register();
    assert!(LongNameEffect::registered_name().len() > 255);

    let record = PictureRecord {
        op_data: vec![1],
        paints: vec![Paint::new(0xff99_8877, 1.0, PaintStyle::Stroke)
            .with_effect(Arc::new(LongNameEffect { seed: 0xc0de }))],
        ..Default::default()
    };
    let picture = Picture::new(record, Rect::new(0.0, 0.0, 16.0, 16.0));

    let decoded = decode_picture(&encode_picture(&picture)?)?;
    let effect = decoded.data().paints()[0].effect().expect("effect survives");
    let effect = effect.as_any().downcast_ref::<LongNameEffect>().expect("concrete type");
    assert_eq!(effect.seed, 0xc0de);
    Ok(())
}
